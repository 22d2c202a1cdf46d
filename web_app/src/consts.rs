use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const CSRF_TOKEN_COOKIE_NAME: &str = "csrf_token";
pub const SESSION_COOKIE_NAME: &str = "vet-clinic-session";
pub const IDENTITY_COOKIE_NAME: &str = "user_id";

pub const DATETIME_LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

pub const MIN_PASSWORD_LEN: usize = 8;

pub const MAX_PRODUCT_PRICE: Decimal = dec!(1000000.00);

pub const MAX_AGE_COOKIES: i64 = chrono::TimeDelta::hours(4).num_seconds();
