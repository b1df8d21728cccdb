//! Calculator tool definitions and dispatch

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    add, calculate_age, convert_units, count_word_occurrences, days_between, divide,
    estimate_reading_time, evaluate_expression, format_number, kg_to_lb, km_to_miles, lb_to_kg,
    mean, median, miles_to_km, multiply, range, solve_equation, std_dev, subtract, years_between,
    CalcResult,
};
use crate::core::{Result, ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::registry::{ToolContext, ToolHandler};

const DEFAULT_WPM: i64 = 200;

/// One calculator operation, addressable by its tool name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    ConvertUnits,
    KgToLb,
    LbToKg,
    MilesToKm,
    KmToMiles,
    Mean,
    Median,
    StdDev,
    Range,
    YearsBetween,
    DaysBetween,
    Age,
    CountWords,
    ReadingTime,
    Evaluate,
    Solve,
}

impl CalcOp {
    pub const ALL: &'static [CalcOp] = &[
        CalcOp::Add,
        CalcOp::Subtract,
        CalcOp::Multiply,
        CalcOp::Divide,
        CalcOp::ConvertUnits,
        CalcOp::KgToLb,
        CalcOp::LbToKg,
        CalcOp::MilesToKm,
        CalcOp::KmToMiles,
        CalcOp::Mean,
        CalcOp::Median,
        CalcOp::StdDev,
        CalcOp::Range,
        CalcOp::YearsBetween,
        CalcOp::DaysBetween,
        CalcOp::Age,
        CalcOp::CountWords,
        CalcOp::ReadingTime,
        CalcOp::Evaluate,
        CalcOp::Solve,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CalcOp::Add => "add_tool",
            CalcOp::Subtract => "subtract_tool",
            CalcOp::Multiply => "multiply_tool",
            CalcOp::Divide => "divide_tool",
            CalcOp::ConvertUnits => "convert_units_tool",
            CalcOp::KgToLb => "kg_to_lb_tool",
            CalcOp::LbToKg => "lb_to_kg_tool",
            CalcOp::MilesToKm => "miles_to_km_tool",
            CalcOp::KmToMiles => "km_to_miles_tool",
            CalcOp::Mean => "calculate_mean_tool",
            CalcOp::Median => "calculate_median_tool",
            CalcOp::StdDev => "calculate_std_dev_tool",
            CalcOp::Range => "calculate_range_tool",
            CalcOp::YearsBetween => "calculate_years_between_tool",
            CalcOp::DaysBetween => "calculate_days_between_tool",
            CalcOp::Age => "calculate_age_tool",
            CalcOp::CountWords => "count_word_occurrences_tool",
            CalcOp::ReadingTime => "estimate_reading_time_tool",
            CalcOp::Evaluate => "evaluate_expression_tool",
            CalcOp::Solve => "solve_equation_tool",
        }
    }

    pub fn from_name(name: &str) -> Option<CalcOp> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }

    pub fn category(self) -> ToolCategory {
        match self {
            CalcOp::Add | CalcOp::Subtract | CalcOp::Multiply | CalcOp::Divide => {
                ToolCategory::Arithmetic
            }
            CalcOp::ConvertUnits
            | CalcOp::KgToLb
            | CalcOp::LbToKg
            | CalcOp::MilesToKm
            | CalcOp::KmToMiles => ToolCategory::Conversion,
            CalcOp::Mean | CalcOp::Median | CalcOp::StdDev | CalcOp::Range => {
                ToolCategory::Statistics
            }
            CalcOp::YearsBetween | CalcOp::DaysBetween | CalcOp::Age => ToolCategory::Date,
            CalcOp::CountWords | CalcOp::ReadingTime => ToolCategory::Text,
            CalcOp::Evaluate | CalcOp::Solve => ToolCategory::Symbolic,
        }
    }

    fn description(self) -> &'static str {
        match self {
            CalcOp::Add => "Add a list of numbers together.",
            CalcOp::Subtract => "Subtract one number from another.",
            CalcOp::Multiply => "Multiply a list of numbers together.",
            CalcOp::Divide => "Divide one number by another.",
            CalcOp::ConvertUnits => {
                "Convert a value between units of length, mass, volume, time, speed, area or temperature."
            }
            CalcOp::KgToLb => "Convert kilograms to pounds.",
            CalcOp::LbToKg => "Convert pounds to kilograms.",
            CalcOp::MilesToKm => "Convert miles to kilometers.",
            CalcOp::KmToMiles => "Convert kilometers to miles.",
            CalcOp::Mean => "Calculate the arithmetic mean of a list of numbers.",
            CalcOp::Median => "Calculate the median of a list of numbers.",
            CalcOp::StdDev => "Calculate the sample standard deviation of a list of numbers.",
            CalcOp::Range => "Calculate the range (max - min) of a list of numbers.",
            CalcOp::YearsBetween => "Calculate the number of years between two dates.",
            CalcOp::DaysBetween => "Calculate the number of days between two dates.",
            CalcOp::Age => "Calculate age in years based on a birth date.",
            CalcOp::CountWords => "Count case-insensitive occurrences of a word in text.",
            CalcOp::ReadingTime => "Estimate reading time for text in minutes.",
            CalcOp::Evaluate => "Evaluate a mathematical expression such as '3 + 4 * (2 - 1)'.",
            CalcOp::Solve => {
                "Solve an equation containing one '=' for a target variable, e.g. 'F = m*a' for 'a'."
            }
        }
    }

    fn parameters(self) -> Value {
        let number = |desc: &str| json!({"type": "number", "description": desc});
        let string = |desc: &str| json!({"type": "string", "description": desc});
        let numbers = json!({
            "type": "array",
            "items": {"type": "number"},
            "description": "List of numbers"
        });

        let (properties, required) = match self {
            CalcOp::Add | CalcOp::Multiply | CalcOp::Mean | CalcOp::Median | CalcOp::StdDev
            | CalcOp::Range => (json!({"numbers": numbers}), vec!["numbers"]),
            CalcOp::Subtract => (
                json!({
                    "minuend": number("Number to subtract from"),
                    "subtrahend": number("Number to subtract")
                }),
                vec!["minuend", "subtrahend"],
            ),
            CalcOp::Divide => (
                json!({
                    "dividend": number("Number to be divided"),
                    "divisor": number("Number to divide by")
                }),
                vec!["dividend", "divisor"],
            ),
            CalcOp::ConvertUnits => (
                json!({
                    "value": number("Quantity to convert"),
                    "from_unit": string("Unit of the value, e.g. 'miles'"),
                    "to_unit": string("Target unit, e.g. 'kilometers'")
                }),
                vec!["value", "from_unit", "to_unit"],
            ),
            CalcOp::KgToLb => (json!({"kg": number("Mass in kilograms")}), vec!["kg"]),
            CalcOp::LbToKg => (json!({"lb": number("Mass in pounds")}), vec!["lb"]),
            CalcOp::MilesToKm => (json!({"miles": number("Distance in miles")}), vec!["miles"]),
            CalcOp::KmToMiles => (json!({"km": number("Distance in kilometers")}), vec!["km"]),
            CalcOp::YearsBetween | CalcOp::DaysBetween => (
                json!({
                    "start_date_str": string("Start date, e.g. '1776-07-04'"),
                    "end_date_str": string("End date")
                }),
                vec!["start_date_str", "end_date_str"],
            ),
            CalcOp::Age => (
                json!({"birth_date_str": string("Birth date, e.g. 'March 14, 1879'")}),
                vec!["birth_date_str"],
            ),
            CalcOp::CountWords => (
                json!({
                    "text": string("Text to search"),
                    "word": string("Word to count")
                }),
                vec!["text", "word"],
            ),
            CalcOp::ReadingTime => (
                json!({
                    "text": string("Text to read"),
                    "wpm": {"type": "integer", "description": "Words per minute (default 200)"}
                }),
                vec!["text"],
            ),
            CalcOp::Evaluate => (
                json!({"expression": string("Arithmetic expression")}),
                vec!["expression"],
            ),
            CalcOp::Solve => (
                json!({
                    "equation_str": string("Equation with exactly one '='"),
                    "target_var": string("Variable to solve for")
                }),
                vec!["equation_str", "target_var"],
            ),
        };

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }

    /// Run the operation. `Err` carries the message returned to the model.
    pub fn run(self, call: &ToolCall) -> CalcResult<String> {
        let num = |key: &str| {
            call.get_f64(key)
                .ok_or_else(|| format!("Missing or non-numeric argument '{}'", key))
        };
        let list = |key: &str| {
            call.get_f64_list(key)
                .ok_or_else(|| format!("Argument '{}' must be a list of numbers", key))
        };
        let text = |key: &str| {
            call.get_string(key)
                .ok_or_else(|| format!("Missing argument '{}'", key))
        };

        let value = match self {
            CalcOp::Add => add(&list("numbers")?),
            CalcOp::Subtract => subtract(num("minuend")?, num("subtrahend")?),
            CalcOp::Multiply => multiply(&list("numbers")?),
            CalcOp::Divide => divide(num("dividend")?, num("divisor")?)?,
            CalcOp::ConvertUnits => {
                let out = convert_units(num("value")?, &text("from_unit")?, &text("to_unit")?);
                return if out.starts_with("Conversion error") {
                    Err(out)
                } else {
                    Ok(out)
                };
            }
            CalcOp::KgToLb => kg_to_lb(num("kg")?),
            CalcOp::LbToKg => lb_to_kg(num("lb")?),
            CalcOp::MilesToKm => miles_to_km(num("miles")?),
            CalcOp::KmToMiles => km_to_miles(num("km")?),
            CalcOp::Mean => mean(&list("numbers")?)?,
            CalcOp::Median => median(&list("numbers")?)?,
            CalcOp::StdDev => std_dev(&list("numbers")?)?,
            CalcOp::Range => range(&list("numbers")?)?,
            CalcOp::YearsBetween => {
                return years_between(&text("start_date_str")?, &text("end_date_str")?)
                    .map(|y| y.to_string())
            }
            CalcOp::DaysBetween => {
                return days_between(&text("start_date_str")?, &text("end_date_str")?)
                    .map(|d| d.to_string())
            }
            CalcOp::Age => return calculate_age(&text("birth_date_str")?).map(|a| a.to_string()),
            CalcOp::CountWords => {
                return Ok(count_word_occurrences(&text("text")?, &text("word")?).to_string())
            }
            CalcOp::ReadingTime => {
                let wpm = call.get_i64("wpm").unwrap_or(DEFAULT_WPM);
                let wpm = u32::try_from(wpm).unwrap_or(0);
                return estimate_reading_time(&text("text")?, wpm);
            }
            CalcOp::Evaluate => {
                let out = evaluate_expression(&text("expression")?);
                return if out.starts_with("Evaluation error") {
                    Err(out)
                } else {
                    Ok(out)
                };
            }
            CalcOp::Solve => {
                let out = solve_equation(&text("equation_str")?, &text("target_var")?);
                return if out.starts_with("Equation solving error") || out == "No solution found"
                {
                    Err(out)
                } else {
                    Ok(out)
                };
            }
        };

        Ok(format_number(value))
    }
}

#[async_trait]
impl ToolHandler for CalcOp {
    async fn invoke(&self, call: &ToolCall, _ctx: &ToolContext) -> Result<ToolResult> {
        let result = match self.run(call) {
            Ok(output) => ToolResult::success(self.name(), output),
            Err(message) => {
                tracing::debug!(tool = self.name(), %message, "Calculator reported an error");
                ToolResult::failure(self.name(), message)
            }
        };
        Ok(result)
    }
}
