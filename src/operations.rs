// operations.rs

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{CalculatorError, Result};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Power,
    Root,
    Modulus,
    IntegerDivision,
    Percentage,
    AbsoluteDifference,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
        Operation::Power,
        Operation::Root,
        Operation::Modulus,
        Operation::IntegerDivision,
        Operation::Percentage,
        Operation::AbsoluteDifference,
    ];

    /// Command identifier typed at the prompt.
    pub fn id(self) -> &'static str {
        match self {
            Operation::Addition => "add",
            Operation::Subtraction => "subtract",
            Operation::Multiplication => "multiply",
            Operation::Division => "divide",
            Operation::Power => "power",
            Operation::Root => "root",
            Operation::Modulus => "modulus",
            Operation::IntegerDivision => "int_divide",
            Operation::Percentage => "percent",
            Operation::AbsoluteDifference => "abs_diff",
        }
    }

    /// Name stored in history records and files.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Addition => "Addition",
            Operation::Subtraction => "Subtraction",
            Operation::Multiplication => "Multiplication",
            Operation::Division => "Division",
            Operation::Power => "Power",
            Operation::Root => "Root",
            Operation::Modulus => "Modulus",
            Operation::IntegerDivision => "IntegerDivision",
            Operation::Percentage => "Percentage",
            Operation::AbsoluteDifference => "AbsoluteDifference",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::Addition => "Add two numbers",
            Operation::Subtraction => "Subtract the second number from the first",
            Operation::Multiplication => "Multiply two numbers",
            Operation::Division => "Divide the first number by the second",
            Operation::Power => "Raise the first number to the power of the second",
            Operation::Root => "Calculate the nth root of a number",
            Operation::Modulus => "Remainder of dividing the first number by the second",
            Operation::IntegerDivision => "Divide and discard the fractional part",
            Operation::Percentage => "Express the first number as a percentage of the second",
            Operation::AbsoluteDifference => "Absolute difference between two numbers",
        }
    }

    pub fn execute(self, a: Decimal, b: Decimal) -> Result<Decimal> {
        match self {
            Operation::Addition => a.checked_add(b).ok_or_else(overflow),
            Operation::Subtraction => a.checked_sub(b).ok_or_else(overflow),
            Operation::Multiplication => a.checked_mul(b).ok_or_else(overflow),
            Operation::Division => {
                if b.is_zero() {
                    return Err(CalculatorError::operation("Division by zero is not allowed"));
                }
                a.checked_div(b).ok_or_else(overflow)
            }
            Operation::Power => {
                if b.is_sign_negative() && !b.is_zero() {
                    return Err(CalculatorError::validation("Negative exponents not supported"));
                }
                if a.is_sign_negative() && !b.fract().is_zero() {
                    return Err(CalculatorError::validation(
                        "Fractional power of a negative number is undefined",
                    ));
                }
                let exact = if b.fract().is_zero() { b.to_u64() } else { None };
                match exact {
                    Some(exp) => a.checked_powu(exp),
                    None => a.checked_powd(b),
                }
                .ok_or_else(|| CalculatorError::operation("Power result is undefined or out of range"))
            }
            Operation::Root => {
                if a.is_sign_negative() && !a.is_zero() {
                    return Err(CalculatorError::validation("Cannot calculate root of negative number"));
                }
                if b.is_zero() {
                    return Err(CalculatorError::validation("Zero root is undefined"));
                }
                if a.is_zero() {
                    return Ok(Decimal::ZERO);
                }
                let root = if b == Decimal::TWO {
                    a.sqrt()
                } else {
                    Decimal::ONE.checked_div(b).and_then(|exp| a.checked_powd(exp))
                };
                root.ok_or_else(|| CalculatorError::operation("Root result is undefined or out of range"))
            }
            Operation::Modulus => {
                if b.is_zero() {
                    return Err(CalculatorError::operation("Modulus by zero is not allowed"));
                }
                a.checked_rem(b).ok_or_else(overflow)
            }
            Operation::IntegerDivision => {
                if b.is_zero() {
                    return Err(CalculatorError::operation("Integer division by zero is not allowed"));
                }
                a.checked_div(b).map(|q| q.trunc()).ok_or_else(overflow)
            }
            Operation::Percentage => {
                if b.is_zero() {
                    return Err(CalculatorError::operation("Percentage base cannot be zero"));
                }
                a.checked_div(b)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .ok_or_else(overflow)
            }
            Operation::AbsoluteDifference => a.checked_sub(b).map(|d| d.abs()).ok_or_else(overflow),
        }
    }
}

fn overflow() -> CalculatorError {
    CalculatorError::operation("Arithmetic overflow")
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CalculatorError;

    /// Accepts the command identifier or the record name, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Operation::ALL
            .into_iter()
            .find(|op| op.id().eq_ignore_ascii_case(wanted) || op.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CalculatorError::validation(format!("Unknown operation: {}", wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn basic_arithmetic_is_exact() {
        assert_eq!(Operation::Addition.execute(dec("0.1"), dec("0.2")).unwrap(), dec("0.3"));
        assert_eq!(Operation::Subtraction.execute(dec("5"), dec("7.5")).unwrap(), dec("-2.5"));
        assert_eq!(Operation::Multiplication.execute(dec("3"), dec("4")).unwrap(), dec("12"));
        assert_eq!(Operation::Division.execute(dec("10"), dec("4")).unwrap(), dec("2.5"));
    }

    #[test]
    fn division_by_zero_is_an_operation_error() {
        for op in [
            Operation::Division,
            Operation::Modulus,
            Operation::IntegerDivision,
            Operation::Percentage,
        ] {
            let err = op.execute(dec("1"), Decimal::ZERO).unwrap_err();
            assert!(err.is_operation(), "{:?} gave {:?}", op, err);
        }
    }

    #[test]
    fn extended_operations() {
        assert_eq!(Operation::Power.execute(dec("2"), dec("10")).unwrap(), dec("1024"));
        assert_eq!(Operation::Power.execute(dec("7"), dec("0")).unwrap(), dec("1"));
        assert_eq!(Operation::Modulus.execute(dec("10"), dec("3")).unwrap(), dec("1"));
        assert_eq!(Operation::IntegerDivision.execute(dec("7"), dec("2")).unwrap(), dec("3"));
        assert_eq!(Operation::IntegerDivision.execute(dec("-7"), dec("2")).unwrap(), dec("-3"));
        assert_eq!(Operation::Percentage.execute(dec("25"), dec("200")).unwrap(), dec("12.5"));
        assert_eq!(Operation::AbsoluteDifference.execute(dec("3"), dec("10")).unwrap(), dec("7"));
        let root = Operation::Root.execute(dec("16"), dec("2")).unwrap();
        assert_eq!(root.round_dp(10), dec("4"));
    }

    #[test]
    fn domain_violations_on_power_and_root_are_validation_errors() {
        assert!(Operation::Power.execute(dec("2"), dec("-1")).unwrap_err().is_validation());
        assert!(Operation::Power.execute(dec("-8"), dec("0.5")).unwrap_err().is_validation());
        assert!(Operation::Power.execute(dec("-16"), dec("0.25")).unwrap_err().is_validation());
        assert_eq!(Operation::Power.execute(dec("-2"), dec("3")).unwrap(), dec("-8"));
        assert!(Operation::Root.execute(dec("-8"), dec("3")).unwrap_err().is_validation());
        assert!(Operation::Root.execute(dec("8"), dec("0")).unwrap_err().is_validation());
    }

    #[test]
    fn overflow_is_reported() {
        let err = Operation::Multiplication.execute(Decimal::MAX, dec("2")).unwrap_err();
        assert_eq!(err, CalculatorError::operation("Arithmetic overflow"));
    }

    #[test]
    fn parses_ids_and_names() {
        assert_eq!("add".parse::<Operation>().unwrap(), Operation::Addition);
        assert_eq!("Multiplication".parse::<Operation>().unwrap(), Operation::Multiplication);
        assert_eq!("INT_DIVIDE".parse::<Operation>().unwrap(), Operation::IntegerDivision);
        let err = "sqrt".parse::<Operation>().unwrap_err();
        assert_eq!(err, CalculatorError::validation("Unknown operation: sqrt"));
    }
}
