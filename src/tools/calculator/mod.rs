//! Calculator toolbox
//!
//! Deterministic arithmetic, statistics, unit, date, text and expression
//! functions exposed to the reasoning agent. Every function reports failure as
//! a descriptive message so nothing escapes the tool boundary.

mod arithmetic;
mod dates;
mod expr;
mod text;
mod tool;
mod units;

pub use arithmetic::{
    add, divide, kg_to_lb, km_to_miles, lb_to_kg, mean, median, miles_to_km, multiply, range,
    std_dev, subtract,
};
pub use dates::{age_on, calculate_age, days_between, parse_date, years_between};
pub use expr::{evaluate_expression, solve_equation, Expr};
pub use text::{count_word_occurrences, estimate_reading_time};
pub use tool::CalcOp;
pub use units::convert_units;

use std::sync::Arc;

use crate::core::Result;
use crate::tools::registry::{ToolRegistry, ToolSpec};

/// Outcome of a calculator function: a value, or a message for the model
pub type CalcResult<T> = std::result::Result<T, String>;

/// Register every calculator tool
pub fn register_tools(registry: &mut ToolRegistry) -> Result<()> {
    for op in CalcOp::ALL {
        registry.register(ToolSpec::new(op.definition(), op.category(), Arc::new(*op)))?;
    }
    Ok(())
}

/// Render a number the way a person would write it: integers without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// `%g`-style formatting with `precision` significant digits
pub fn format_significant(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return format!("{}", value);
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
