//! Arithmetic, statistics and fixed-factor conversions

use super::CalcResult;

const LB_PER_KG: f64 = 2.20462;
const KM_PER_MILE: f64 = 1.60934;

pub fn add(numbers: &[f64]) -> f64 {
    numbers.iter().sum()
}

pub fn subtract(minuend: f64, subtrahend: f64) -> f64 {
    minuend - subtrahend
}

pub fn multiply(numbers: &[f64]) -> f64 {
    numbers.iter().product()
}

pub fn divide(dividend: f64, divisor: f64) -> CalcResult<f64> {
    if divisor == 0.0 {
        return Err("Division by zero is not allowed.".to_string());
    }
    Ok(dividend / divisor)
}

pub fn mean(values: &[f64]) -> CalcResult<f64> {
    if values.is_empty() {
        return Err("mean requires at least one data point".to_string());
    }
    Ok(add(values) / values.len() as f64)
}

pub fn median(values: &[f64]) -> CalcResult<f64> {
    if values.is_empty() {
        return Err("no median for empty data".to_string());
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Sample standard deviation (n - 1 denominator)
pub fn std_dev(values: &[f64]) -> CalcResult<f64> {
    if values.len() < 2 {
        return Err("variance requires at least two data points".to_string());
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub fn range(values: &[f64]) -> CalcResult<f64> {
    let max = values.iter().copied().reduce(f64::max);
    let min = values.iter().copied().reduce(f64::min);
    match (max, min) {
        (Some(max), Some(min)) => Ok(max - min),
        _ => Err("range requires at least one data point".to_string()),
    }
}

pub fn kg_to_lb(kg: f64) -> f64 {
    kg * LB_PER_KG
}

pub fn lb_to_kg(lb: f64) -> f64 {
    lb / LB_PER_KG
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        assert_eq!(add(&[2.0, 2.0]), 4.0);
        assert_eq!(add(&[]), 0.0);
        assert_eq!(subtract(10.0, 4.5), 5.5);
        assert_eq!(multiply(&[2.0, 3.0, 4.0]), 24.0);
        assert_eq!(divide(9.0, 3.0), Ok(3.0));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            divide(1.0, 0.0),
            Err("Division by zero is not allowed.".to_string())
        );
    }

    #[test]
    fn test_statistics() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&data), Ok(5.0));
        assert_eq!(median(&data), Ok(4.5));
        assert_eq!(median(&[3.0, 1.0, 2.0]), Ok(2.0));
        assert_eq!(range(&data), Ok(7.0));

        let sd = std_dev(&data).unwrap();
        assert!((sd - 2.138089935299395).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_need_data() {
        assert!(mean(&[]).is_err());
        assert!(median(&[]).is_err());
        assert!(range(&[]).is_err());
        assert!(std_dev(&[1.0]).is_err());
    }

    #[test]
    fn test_fixed_conversions() {
        assert!((miles_to_km(100.0) - 160.934).abs() < 1e-9);
        assert!((km_to_miles(160.934) - 100.0).abs() < 1e-9);
        assert!((kg_to_lb(1.0) - 2.20462).abs() < 1e-12);
        assert!((lb_to_kg(2.20462) - 1.0).abs() < 1e-12);
    }
}
