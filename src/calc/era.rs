use serde::{Deserialize, Serialize};

/// Japanese eras used in birth-date cells, e.g. `S50.04.01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Era {
    Taisho,
    Showa,
    Heisei,
    Reiwa,
}

impl Era {
    pub fn from_code(code: char) -> Option<Era> {
        match code.to_ascii_uppercase() {
            'T' => Some(Era::Taisho),
            'S' => Some(Era::Showa),
            'H' => Some(Era::Heisei),
            'R' => Some(Era::Reiwa),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Era> {
        match name {
            "大正" => Some(Era::Taisho),
            "昭和" => Some(Era::Showa),
            "平成" => Some(Era::Heisei),
            "令和" => Some(Era::Reiwa),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Era::Taisho => 'T',
            Era::Showa => 'S',
            Era::Heisei => 'H',
            Era::Reiwa => 'R',
        }
    }

    /// Gregorian year of era year 0; year N of the era is `offset + N`.
    pub fn offset(self) -> i32 {
        match self {
            Era::Taisho => 1911,
            Era::Showa => 1925,
            Era::Heisei => 1988,
            Era::Reiwa => 2018,
        }
    }
}

/// Gregorian birth year from an era-tagged date: an era letter (or kanji era
/// name) followed by a two-digit year; whatever follows is ignored.
pub fn parse_birth_year(value: &str) -> Option<i32> {
    let value = value.trim();
    let mut chars = value.chars();
    let first = chars.next()?;

    let (era, rest) = match Era::from_code(first) {
        Some(era) => (era, chars.as_str()),
        None => {
            let name: String = value.chars().take(2).collect();
            let era = Era::from_name(&name)?;
            (era, &value[name.len()..])
        }
    };

    let digits: String = rest.chars().take(2).map(normalize_digit).collect();
    if digits.chars().count() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    if year == 0 {
        return None;
    }
    Some(era.offset() + year)
}

pub(crate) fn normalize_digit(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        _ => c,
    }
}
