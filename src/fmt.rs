/// Format an amount as Rupiah with dot thousands separators: Rp 1.234.567
/// Fractional parts are rare in IDR; they are kept with a comma only when
/// present: Rp 1.234,50
pub fn rupiah(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    let body = if dec_part == "00" {
        with_dots
    } else {
        format!("{with_dots},{dec_part}")
    };

    if negative {
        format!("-Rp {body}")
    } else {
        format!("Rp {body}")
    }
}
