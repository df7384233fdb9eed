//! Raw cell values as they come out of a CSV or workbook

use calamine::Data;

/// A single uploaded cell, before any coercion
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Missing or empty cell
    #[default]
    Empty,
    /// Text as typed in the file
    Text(String),
    /// Numeric cell (workbooks only, CSV fields are always text)
    Number(f64),
    /// Boolean cell (workbooks only)
    Bool(bool),
    /// Date or time cell (workbooks only), rendered as text
    Date(String),
    /// Formula error such as `#DIV/0!` (workbooks only)
    Error(String),
}

/// Why a cell could not become a price
#[derive(Debug, Clone, PartialEq)]
pub struct NotNumeric(pub String);

impl Cell {
    /// CSV field; an empty field is a null
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    /// Convert a calamine cell
    pub fn from_excel(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Date(
                dt.as_datetime()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| dt.to_string()),
            ),
            Data::DateTimeIso(s) => Cell::Date(s.clone()),
            Data::DurationIso(s) => Cell::Date(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Key value of this cell, trimmed; `None` when blank or an error
    pub fn to_code(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { Some(s.to_string()) }
            }
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Date(s) => Some(s.clone()),
            // An error cell carries no key
            Cell::Error(_) => None,
        }
    }

    /// Parse-or-null: blank cells are `Ok(None)`, anything that is not a
    /// finite decimal number is an error
    pub fn to_price(&self) -> Result<Option<f64>, NotNumeric> {
        match self {
            Cell::Empty => Ok(None),
            Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
            Cell::Number(n) => Err(NotNumeric(n.to_string())),
            Cell::Bool(b) => Err(NotNumeric(b.to_string())),
            Cell::Date(s) | Cell::Error(s) => Err(NotNumeric(s.clone())),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Some(n)),
                    _ => Err(NotNumeric(s.clone())),
                }
            }
        }
    }
}

/// Whole numbers print without a trailing `.0` so that a numeric key cell
/// `1001` reads the same as the text `1001`
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Date(s) | Cell::Error(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn test_to_price() {
        assert_eq!(Cell::Empty.to_price(), Ok(None));
        assert_eq!(Cell::Text("  ".to_string()).to_price(), Ok(None));
        assert_eq!(Cell::Text("25000".to_string()).to_price(), Ok(Some(25000.0)));
        assert_eq!(Cell::Text(" 12.5 ".to_string()).to_price(), Ok(Some(12.5)));
        assert_eq!(Cell::Number(30000.0).to_price(), Ok(Some(30000.0)));
        assert_eq!(
            Cell::Text("abc".to_string()).to_price(),
            Err(NotNumeric("abc".to_string()))
        );
        assert!(Cell::Text("NaN".to_string()).to_price().is_err());
        assert!(Cell::Text("inf".to_string()).to_price().is_err());
        assert!(Cell::Bool(true).to_price().is_err());
    }

    #[test]
    fn test_to_code() {
        assert_eq!(Cell::Empty.to_code(), None);
        assert_eq!(Cell::Text(" ".to_string()).to_code(), None);
        assert_eq!(Cell::Text(" c-001 ".to_string()).to_code(), Some("c-001".to_string()));
        assert_eq!(Cell::Number(1001.0).to_code(), Some("1001".to_string()));
        assert_eq!(Cell::Number(10.5).to_code(), Some("10.5".to_string()));
    }

    #[test]
    fn test_from_excel() {
        assert_eq!(Cell::from_excel(&Data::Empty), Cell::Empty);
        assert_eq!(Cell::from_excel(&Data::String(String::new())), Cell::Empty);
        assert_eq!(Cell::from_excel(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(
            Cell::from_excel(&Data::String("c-001".to_string())),
            Cell::Text("c-001".to_string())
        );
    }

    #[test]
    fn test_error_cells_are_not_prices() {
        let cell = Cell::from_excel(&Data::Error(CellErrorType::Div0));
        assert_eq!(cell, Cell::Error("#DIV/0!".to_string()));
        assert!(!cell.is_blank());
        assert_eq!(cell.to_price(), Err(NotNumeric("#DIV/0!".to_string())));
        assert_eq!(cell.to_code(), None);
    }

    #[test]
    fn test_date_cells_are_not_prices() {
        let serial = ExcelDateTime::new(45000.5, ExcelDateTimeType::DateTime, false);
        let cell = Cell::from_excel(&Data::DateTime(serial));
        assert_eq!(cell, Cell::Date("2023-03-15 12:00:00".to_string()));
        assert!(cell.to_price().is_err());

        let iso = Cell::from_excel(&Data::DateTimeIso("2023-03-15T12:00:00".to_string()));
        assert!(iso.to_price().is_err());
    }
}
