use super::*;

// -----------------------------------------------------------------------
// parse_count
// -----------------------------------------------------------------------

#[test]
fn parse_count_plain_integer() {
    assert_eq!(parse_count("1234"), 1234);
}

#[test]
fn parse_count_strips_thousands_separators() {
    assert_eq!(parse_count("1,234"), 1234);
    assert_eq!(parse_count("12,345,678"), 12_345_678);
}

#[test]
fn parse_count_strips_surrounding_whitespace() {
    assert_eq!(parse_count("  987 "), 987);
    assert_eq!(parse_count("1 234"), 1234);
}

#[test]
fn parse_count_k_suffix() {
    assert_eq!(parse_count("12.3k"), 12_300);
    assert_eq!(parse_count("12.3K"), 12_300);
    assert_eq!(parse_count("5k"), 5_000);
}

#[test]
fn parse_count_m_suffix() {
    assert_eq!(parse_count("4m"), 4_000_000);
    assert_eq!(parse_count("1.2M"), 1_200_000);
}

#[test]
fn parse_count_b_suffix() {
    assert_eq!(parse_count("2.5b"), 2_500_000_000);
}

#[test]
fn parse_count_rounds_to_nearest() {
    // 1.2345k = 1234.5 -> rounds half away from zero
    assert_eq!(parse_count("1.2345k"), 1235);
}

#[test]
fn parse_count_suffix_with_space() {
    assert_eq!(parse_count("12.3 K"), 12_300);
}

#[test]
fn parse_count_empty_is_zero() {
    assert_eq!(parse_count(""), 0);
    assert_eq!(parse_count("   "), 0);
}

#[test]
fn parse_count_unparseable_is_zero() {
    assert_eq!(parse_count("abc"), 0);
    assert_eq!(parse_count("k"), 0);
    assert_eq!(parse_count("--"), 0);
}

#[test]
fn parse_count_negative_is_zero() {
    assert_eq!(parse_count("-500"), 0);
}

// -----------------------------------------------------------------------
// parse_percentage
// -----------------------------------------------------------------------

#[test]
fn parse_percentage_with_sign() {
    assert_eq!(parse_percentage("6.5%"), Some(6.5));
}

#[test]
fn parse_percentage_without_sign() {
    assert_eq!(parse_percentage("4.5"), Some(4.5));
}

#[test]
fn parse_percentage_whitespace() {
    assert_eq!(parse_percentage("  2.75 % "), Some(2.75));
}

#[test]
fn parse_percentage_zero_is_present() {
    // A measured zero must stay distinguishable from absent data.
    assert_eq!(parse_percentage("0%"), Some(0.0));
}

#[test]
fn parse_percentage_empty_is_absent() {
    assert_eq!(parse_percentage(""), None);
    assert_eq!(parse_percentage("  "), None);
}

#[test]
fn parse_percentage_unparseable_is_absent() {
    assert_eq!(parse_percentage("n/a"), None);
    assert_eq!(parse_percentage("%"), None);
}
