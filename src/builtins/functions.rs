use crate::ast::Function;
use crate::evaluator::EvalError;
use crate::moment::{Moment, ParseMomentError};
use crate::registry::RegistryBuilder;
use crate::value::{DataType, Value};

use super::{boolean, moment, number, text};

/// Branch types `IF` is overloaded on, in registration order.
const IF_BRANCHES: [DataType; 5] = [
    DataType::Boolean,
    DataType::Array,
    DataType::DateTime,
    DataType::Number,
    DataType::String,
];

pub(super) fn register(builder: &mut RegistryBuilder) {
    for branch in IF_BRANCHES {
        builder.add_function(Function::new(
            "IF",
            vec![DataType::Boolean, branch, branch],
            branch,
            choose,
        ));
    }

    builder
        .add_function(Function::new(
            "DATEDIFF",
            vec![DataType::DateTime, DataType::DateTime],
            DataType::Number,
            date_diff,
        ))
        .add_function(Function::new(
            "DATEADD",
            vec![DataType::String, DataType::Number, DataType::DateTime],
            DataType::DateTime,
            date_add,
        ))
        .add_function(Function::new(
            "DATEADD",
            vec![DataType::String, DataType::Number, DataType::String],
            DataType::DateTime,
            date_add_text,
        ));
}

fn wrong_arity(function: &str, expected: usize, found: usize) -> EvalError {
    EvalError::InvalidArgument {
        function: function.to_string(),
        message: format!("expected {expected} arguments, got {found}"),
    }
}

/// `IF(condition, when_true, when_false)`
///
/// Both branches have already been evaluated; a missing branch value is
/// passed through unchanged.
fn choose(args: &[Value]) -> Result<Value, EvalError> {
    let [condition, when_true, when_false] = args else {
        return Err(wrong_arity("IF", 3, args.len()));
    };
    if boolean("IF", condition)? {
        Ok(when_true.clone())
    } else {
        Ok(when_false.clone())
    }
}

/// `DATEDIFF(a, b)`: days from `b` to `a`, fractional.
fn date_diff(args: &[Value]) -> Result<Value, EvalError> {
    let [a, b] = args else {
        return Err(wrong_arity("DATEDIFF", 2, args.len()));
    };
    let (a, b) = (moment("DATEDIFF", a)?, moment("DATEDIFF", b)?);
    Ok(Value::Number(a.days_since(&b)))
}

/// `DATEADD(interval, count, date)`
///
/// Interval codes, case-insensitive:
///
/// | Code | Adds |
/// |---|---|
/// | `yyyy` | whole years |
/// | `q` | whole quarters |
/// | `m` | whole months |
/// | `y`, `d`, `w` | days |
/// | `ww` | weeks |
/// | `h`, `n`, `s` | hours, minutes, seconds |
///
/// Year, quarter and month counts are truncated toward zero; the others may be
/// fractional.
fn date_add(args: &[Value]) -> Result<Value, EvalError> {
    let [interval, count, date] = args else {
        return Err(wrong_arity("DATEADD", 3, args.len()));
    };
    shift(
        text("DATEADD", interval)?,
        number("DATEADD", count)?,
        moment("DATEADD", date)?,
    )
}

/// `DATEADD(interval, count, "YYYY-MM-DD[THH:MM[:SS[.fff]]]")`
fn date_add_text(args: &[Value]) -> Result<Value, EvalError> {
    let [interval, count, date] = args else {
        return Err(wrong_arity("DATEADD", 3, args.len()));
    };
    let date: Moment = text("DATEADD", date)?
        .parse()
        .map_err(|e: ParseMomentError| EvalError::InvalidArgument {
            function: "DATEADD".to_string(),
            message: e.to_string(),
        })?;
    shift(text("DATEADD", interval)?, number("DATEADD", count)?, date)
}

fn shift(interval: &str, count: f64, date: Moment) -> Result<Value, EvalError> {
    let interval = interval.to_lowercase();
    let shifted: Option<Moment> = match interval.as_str() {
        "yyyy" => date.add_years(count.trunc() as i64),
        "q" => date.add_months((count * 3.0).trunc() as i64),
        "m" => date.add_months(count.trunc() as i64),
        // "y" adds days exactly like "d", not a day-of-year unit
        "y" | "d" | "w" => date.add_days(count),
        "ww" => date.add_days(count * 7.0),
        "h" => date.add_hours(count),
        "n" => date.add_minutes(count),
        "s" => date.add_seconds(count),
        _ => {
            return Err(EvalError::InvalidArgument {
                function: "DATEADD".to_string(),
                message: format!("unknown interval '{interval}'"),
            });
        }
    };

    shifted
        .map(Value::DateTime)
        .ok_or_else(|| EvalError::InvalidArgument {
            function: "DATEADD".to_string(),
            message: "result is outside the supported date range".to_string(),
        })
}
