/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (schedules, payments, completion) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Monetary amounts (budgets, prices, incomes) in whole currency units.
pub type Money = i64;

/// Today's date in UTC.
pub fn today() -> Date {
    chrono::Utc::now().date_naive()
}
