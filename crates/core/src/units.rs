/// Display units of a metric, as exponents of the base units.
///
/// `Units { bytes: 1, seconds: -1 }` is bytes per second; the default is a
/// dimensionless count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Units {
    pub bytes: i8,
    pub seconds: i8,
}

impl Units {
    pub const NONE: Self = Self { bytes: 0, seconds: 0 };
    pub const BYTES: Self = Self { bytes: 1, seconds: 0 };
    pub const SECONDS: Self = Self { bytes: 0, seconds: 1 };

    /// The same units divided by seconds. Counters are displayed this way once
    /// turned into rates.
    #[must_use]
    pub fn per_second(self) -> Self {
        Self {
            bytes: self.bytes,
            seconds: self.seconds - 1,
        }
    }

    /// Short unit suffix, e.g. `"B/s"`, `"s"`, `"1/s"` or `""`.
    pub fn symbol(self) -> String {
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        for (name, exponent) in [("B", self.bytes), ("s", self.seconds)] {
            match exponent {
                0 => {}
                e if e > 0 => numerator.push(power(name, e)),
                e => denominator.push(power(name, -e)),
            }
        }

        match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => String::new(),
            (false, true) => numerator.join("·"),
            (true, false) => format!("1/{}", denominator.join("·")),
            (false, false) => format!("{}/{}", numerator.join("·"), denominator.join("·")),
        }
    }
}

fn power(name: &str, exponent: i8) -> String {
    if exponent == 1 {
        name.to_string()
    } else {
        format!("{name}^{exponent}")
    }
}

/// Format `value` with an SI prefix and `significant_digits` significant
/// digits, e.g. `format_value(1_536.0, Units::BYTES.per_second(), 3)` is
/// `"1.54 kB/s"`.
pub fn format_value(value: f64, units: Units, significant_digits: u8) -> String {
    const PREFIXES: [(f64, &str); 7] = [
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "µ"),
        (1e-9, "n"),
    ];

    let symbol = units.symbol();
    let magnitude = value.abs();
    let (scale, prefix) = if magnitude == 0.0 || !magnitude.is_finite() {
        (1.0, "")
    } else {
        PREFIXES
            .iter()
            .copied()
            .find(|(scale, _)| magnitude >= *scale)
            .unwrap_or(PREFIXES[PREFIXES.len() - 1])
    };

    let scaled = value / scale;
    let digits = i32::from(significant_digits.max(1));
    let integer_digits = if scaled == 0.0 {
        1
    } else {
        scaled.abs().log10().floor() as i32 + 1
    };
    let decimals = (digits - integer_digits).max(0) as usize;
    let number = format!("{scaled:.decimals$}");

    match (prefix, symbol.as_str()) {
        ("", "") => number,
        _ => format!("{number} {prefix}{symbol}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols() {
        assert_eq!(Units::NONE.symbol(), "");
        assert_eq!(Units::BYTES.symbol(), "B");
        assert_eq!(Units::BYTES.per_second().symbol(), "B/s");
        assert_eq!(Units::NONE.per_second().symbol(), "1/s");
        assert_eq!(Units::SECONDS.per_second(), Units::NONE);
    }

    #[test]
    fn format_with_prefix() {
        assert_eq!(format_value(1_536.0, Units::BYTES.per_second(), 3), "1.54 kB/s");
        assert_eq!(format_value(0.0421, Units::SECONDS, 2), "42 ms");
        assert_eq!(format_value(12.0, Units::NONE, 3), "12.0");
        assert_eq!(format_value(0.0, Units::BYTES, 3), "0.00 B");
    }
}
