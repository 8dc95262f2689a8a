//! Investment Growth
//!
//! Future value of a Systematic Investment Plan (SIP) under monthly
//! compounding.

/// Future value of a recurring monthly investment.
///
/// The annual rate is a decimal (0.12 for 12%) converted to a monthly rate
/// of `annual_rate / 12`; the tenure is whole years converted to months.
/// A zero rate degenerates to a plain sum of contributions. Otherwise the
/// annuity-due closed form applies: each contribution is made at the start
/// of its month and compounds through the end of the tenure.
pub fn sip_future_value(monthly_investment: f64, annual_rate: f64, years: u32) -> f64 {
    let monthly_rate = annual_rate / 12.0;
    let months = (years * 12) as i32;

    if monthly_rate == 0.0 {
        return monthly_investment * f64::from(months);
    }

    monthly_investment * (((1.0 + monthly_rate).powi(months) - 1.0) / monthly_rate)
        * (1.0 + monthly_rate)
}
