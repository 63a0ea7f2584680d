/// Maximum valid Hebrew year (inclusive)
pub const MAX_YEAR: u16 = 9999;

/// Months in a common year
pub const MONTHS_IN_COMMON_YEAR: u8 = 12;
/// Months in a leap year (Adar II inserted)
pub const MONTHS_IN_LEAP_YEAR: u8 = 13;

/// First day of month, used for lower bounds
pub const MIN_DAY: u8 = 1;
/// Length of a full month
pub const LONG_MONTH_DAYS: u8 = 30;

// Nissan-based month numbering
/// Month number for Nissan
pub const NISSAN: u8 = 1;
/// Month number for Iyar
pub const IYAR: u8 = 2;
/// Month number for Sivan
pub const SIVAN: u8 = 3;
/// Month number for Tammuz
pub const TAMMUZ: u8 = 4;
/// Month number for Av
pub const AV: u8 = 5;
/// Month number for Elul
pub const ELUL: u8 = 6;
/// Month number for Tishrei (first month of the civil year)
pub const TISHREI: u8 = 7;
/// Month number for Cheshvan
pub const CHESHVAN: u8 = 8;
/// Month number for Kislev
pub const KISLEV: u8 = 9;
/// Month number for Tevet
pub const TEVET: u8 = 10;
/// Month number for Shevat
pub const SHEVAT: u8 = 11;
/// Month number for Adar (Adar I in leap years)
pub const ADAR: u8 = 12;
/// Month number for Adar II (leap years only)
pub const ADAR_II: u8 = 13;

/// Separators normalized to spaces in transliterated input
pub const INPUT_SEPARATORS: [char; 4] = [',', ':', '-', '/'];
/// Separator between day, month and year in rendered labels
pub const LABEL_SEPARATOR: char = ' ';
/// Separator used when joining result values for the clipboard
pub const COPY_ALL_SEPARATOR: &str = " | ";
