use rand::Rng;

use crate::db::get_connection;
use crate::error::Result;
use crate::payments::{add_payment, BANK_TRANSFER};
use crate::settings::{db_path, get_data_dir};

const STUDENTS: &[(&str, f64)] = &[
    ("Andi Wijaya", 150000.0),
    ("Budi Santoso", 150000.0),
    ("Citra Lestari", 250000.0),
    ("Dewi Anggraini", 150000.0),
    ("Eko Prasetyo", 300000.0),
];

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut rng = rand::thread_rng();

    let mut sample_rows = String::from("Tanggal,Keterangan,No Ref,Jumlah\n");
    for (i, (name, amount)) in STUDENTS.iter().enumerate() {
        let receipt = format!("KWT-{:05}", rng.gen_range(10000..100000));
        let date = format!("2025-03-{:02}", 10 + i as u32);
        add_payment(&conn, name, &receipt, BANK_TRANSFER, *amount, &date)?;

        // Statement rows mirror what a real export looks like: the payer
        // name appears in the description, dates in d/m/Y.
        let day = 10 + i as u32;
        sample_rows.push_str(&format!(
            "{day:02}/03/2025,TRANSFER SPP {},{receipt},{amount}\n",
            name.to_uppercase()
        ));
    }
    // A couple of rows the matcher should leave alone
    sample_rows.push_str("16/03/2025,BIAYA ADMIN,,-6500\n");
    sample_rows.push_str("17/03/2025,SETORAN TUNAI KANTIN,,75000\n");

    let sample_path = get_data_dir().join("demo-statement.csv");
    std::fs::write(&sample_path, sample_rows)?;

    println!("Seeded {} pending payments.", STUDENTS.len());
    println!("Sample statement written to {}", sample_path.display());
    println!("\nTry:");
    println!("  rekon upload {} --bank BCA", sample_path.display());
    println!("  rekon automatch 1");
    println!("  rekon ledgers show 1");
    Ok(())
}
