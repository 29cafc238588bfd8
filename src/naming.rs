//! Episode naming patterns and the translation of legacy naming settings.
//!
//! A naming pattern is a template made of placeholder tokens and literal
//! text:
//!
//! | Token            | Meaning                      |
//! |------------------|------------------------------|
//! | `%SN` / `%S.N`   | show name (dotted variant)   |
//! | `%EN` / `%E.N`   | episode name                 |
//! | `%QN` / `%Q.N`   | quality                      |
//! | `%A-D` / `%A.D`  | air date                     |
//! | `%S` / `%0S`     | season number (zero padded)  |
//! | `%E` / `%0E`     | episode number (zero padded) |
//!
//! Older releases stored a handful of independent toggles instead of a
//! pattern. [`LegacyNaming::to_pattern`] rebuilds the equivalent pattern.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Air-by-date presets. The first one is used when no custom pattern exists.
pub const ABD_PRESETS: [&str; 3] = [
    "%SN - %A-D - %EN",
    "%S.N.%A.D.%E.N.%Q.N",
    "%Y/%0M/%S.N.%A.D.%E.N-%RG",
];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// How season and episode numbers were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EpisodeStyle {
    /// `1x02`
    #[default]
    SeasonXEpisode,
    /// `s01e02`
    LowerSe,
    /// `S01E02`
    UpperSe,
    /// `01x02`
    PaddedSeasonXEpisode,
}

impl EpisodeStyle {
    pub const ALL: [EpisodeStyle; 4] = [
        EpisodeStyle::SeasonXEpisode,
        EpisodeStyle::LowerSe,
        EpisodeStyle::UpperSe,
        EpisodeStyle::PaddedSeasonXEpisode,
    ];

    /// Map a stored `naming_ep_type` index.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn template(self) -> &'static str {
        match self {
            EpisodeStyle::SeasonXEpisode => "%Sx%0E",
            EpisodeStyle::LowerSe => "s%0Se%0E",
            EpisodeStyle::UpperSe => "S%0SE%0E",
            EpisodeStyle::PaddedSeasonXEpisode => "%0Sx%0E",
        }
    }
}

/// Text placed between name segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Dash,
    Space,
}

impl Separator {
    pub const ALL: [Separator; 2] = [Separator::Dash, Separator::Space];

    /// Map a stored `naming_sep_type` index.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Dash => " - ",
            Separator::Space => " ",
        }
    }
}

/// The pre-pattern naming toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyNaming {
    pub use_periods: bool,
    pub episode_style: EpisodeStyle,
    pub separator: Separator,
    pub use_quality: bool,
    pub use_show_name: bool,
    pub use_episode_name: bool,
}

impl Default for LegacyNaming {
    fn default() -> Self {
        Self {
            use_periods: false,
            episode_style: EpisodeStyle::default(),
            separator: Separator::default(),
            use_quality: false,
            use_show_name: true,
            use_episode_name: true,
        }
    }
}

impl LegacyNaming {
    /// Build the pattern these toggles used to produce. With `air_by_date`
    /// the season/episode part becomes the air-date token.
    pub fn to_pattern(&self, air_by_date: bool) -> String {
        let (show_name, episode_name, quality, air_date) = if self.use_periods {
            ("%S.N", "%E.N", "%Q.N", "%A.D")
        } else {
            ("%SN", "%EN", "%QN", "%A-D")
        };
        let numbering = if air_by_date {
            air_date
        } else {
            self.episode_style.template()
        };
        let sep = self.separator.as_str();

        let mut pattern = String::new();
        if self.use_show_name {
            pattern.push_str(show_name);
            pattern.push_str(sep);
        }
        pattern.push_str(numbering);
        if self.use_episode_name {
            pattern.push_str(sep);
            pattern.push_str(episode_name);
        }
        if self.use_quality {
            pattern.push_str(sep);
            pattern.push_str(quality);
        }

        if self.use_periods {
            WHITESPACE_RUN.replace_all(&pattern, ".").into_owned()
        } else {
            pattern
        }
    }
}

/// Why a legacy season folder format could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeasonFormatError {
    #[error("not all arguments converted during string formatting")]
    NotAllArgumentsConverted,
    #[error("not enough arguments for format string")]
    NotEnoughArguments,
    #[error("incomplete format")]
    IncompleteFormat,
    #[error("unsupported format character '{0}'")]
    UnsupportedCharacter(char),
    #[error("format requires a mapping")]
    MappingRequired,
}

/// Convert a printf-style season folder format (`Season %02d`) to a
/// pattern prefix (`Season %0S`).
///
/// The format is rendered with the season number 9, then `09` becomes
/// `%0S` and any remaining `9` becomes `%S`. Literal nines in the format
/// are rewritten too, and that is the established behaviour.
pub fn season_folder_pattern(format: &str) -> Result<String, SeasonFormatError> {
    let rendered = format_with_nine(format)?;
    Ok(rendered.replace("09", "%0S").replace('9', "%S"))
}

/// Whether a pattern's file-name part lacks enough information to identify
/// an episode, so shows using it must keep season folders.
pub fn requires_season_folders(pattern: &str) -> bool {
    let file_part = pattern.rsplit(['/', '\\']).next().unwrap_or(pattern);
    let tokens = scan_tokens(file_part);
    let dated = tokens.contains(&Token::AirDate);
    let numbered = tokens.contains(&Token::Season) && tokens.contains(&Token::Episode);
    !(dated || numbered)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    ShowName,
    EpisodeName,
    Quality,
    AirDate,
    Season,
    Episode,
}

fn scan_tokens(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = pattern;
    while let Some(pos) = rest.find('%') {
        rest = &rest[pos + 1..];
        let (token, consumed) = if rest.starts_with("SN") || rest.starts_with("S.N") {
            (Some(Token::ShowName), if rest.starts_with("SN") { 2 } else { 3 })
        } else if rest.starts_with("EN") || rest.starts_with("E.N") {
            (Some(Token::EpisodeName), if rest.starts_with("EN") { 2 } else { 3 })
        } else if rest.starts_with("QN") || rest.starts_with("Q.N") {
            (Some(Token::Quality), if rest.starts_with("QN") { 2 } else { 3 })
        } else if rest.starts_with("A-D") || rest.starts_with("A.D") {
            (Some(Token::AirDate), 3)
        } else if rest.starts_with("0S") {
            (Some(Token::Season), 2)
        } else if rest.starts_with("0E") {
            (Some(Token::Episode), 2)
        } else if rest.starts_with('S') {
            (Some(Token::Season), 1)
        } else if rest.starts_with('E') {
            (Some(Token::Episode), 1)
        } else {
            (None, 0)
        };
        if let Some(token) = token {
            tokens.push(token);
        }
        rest = &rest[consumed..];
    }
    tokens
}

/// printf-style rendering of `format` with exactly one integer argument, 9.
fn format_with_nine(format: &str) -> Result<String, SeasonFormatError> {
    let mut out = String::new();
    let mut chars = format.chars().peekable();
    let mut consumed = false;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut spec = ConversionSpec::default();
        if chars.peek() == Some(&'(') {
            return Err(SeasonFormatError::MappingRequired);
        }
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left_align = true,
                '0' => spec.zero_pad = true,
                '+' => spec.sign = Some('+'),
                ' ' if spec.sign.is_none() => spec.sign = Some(' '),
                ' ' => {}
                '#' => spec.alternate = true,
                _ => break,
            }
            chars.next();
        }
        if chars.peek() == Some(&'*') {
            // `*` takes the width from the argument list, using up the 9.
            return Err(SeasonFormatError::NotEnoughArguments);
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }
        while matches!(chars.peek(), Some('h' | 'l' | 'L')) {
            chars.next();
        }

        let conversion = chars.next().ok_or(SeasonFormatError::IncompleteFormat)?;
        if conversion == '%' {
            out.push('%');
            continue;
        }
        if consumed {
            return Err(SeasonFormatError::NotEnoughArguments);
        }
        let body = spec.render_nine(conversion)?;
        out.push_str(&spec.pad(body, conversion));
        consumed = true;
    }

    if consumed {
        Ok(out)
    } else {
        Err(SeasonFormatError::NotAllArgumentsConverted)
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&d) = chars.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        digits.push(d);
        chars.next();
    }
    digits.parse().ok()
}

#[derive(Debug, Default)]
struct ConversionSpec {
    left_align: bool,
    zero_pad: bool,
    sign: Option<char>,
    alternate: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl ConversionSpec {
    fn render_nine(&self, conversion: char) -> Result<String, SeasonFormatError> {
        let sign = self.sign.map(String::from).unwrap_or_default();
        let body = match conversion {
            'd' | 'i' | 'u' => format!("{sign}{}", self.min_digits("9")),
            'o' => {
                let prefix = if self.alternate { "0o" } else { "" };
                format!("{sign}{prefix}{}", self.min_digits("11"))
            }
            'x' | 'X' => {
                let prefix = match (self.alternate, conversion) {
                    (false, _) => "",
                    (true, 'x') => "0x",
                    (true, _) => "0X",
                };
                format!("{sign}{prefix}{}", self.min_digits("9"))
            }
            'f' | 'F' => {
                let precision = self.precision.unwrap_or(6);
                let mut s = format!("{sign}{:.*}", precision, 9.0_f64);
                if self.alternate && precision == 0 {
                    s.push('.');
                }
                s
            }
            'e' | 'E' => {
                let precision = self.precision.unwrap_or(6);
                let mantissa = format!("{:.*}", precision, 9.0_f64);
                let e = if conversion == 'e' { 'e' } else { 'E' };
                format!("{sign}{mantissa}{e}+00")
            }
            'g' | 'G' => {
                if self.alternate {
                    let precision = self.precision.unwrap_or(6).max(1);
                    format!("{sign}{:.*}", precision - 1, 9.0_f64)
                } else {
                    format!("{sign}9")
                }
            }
            'c' => "\t".to_string(),
            's' | 'r' | 'a' => match self.precision {
                Some(p) => "9".chars().take(p).collect(),
                None => "9".to_string(),
            },
            other => return Err(SeasonFormatError::UnsupportedCharacter(other)),
        };
        Ok(body)
    }

    fn min_digits(&self, digits: &str) -> String {
        match self.precision {
            Some(p) if p > digits.len() => format!("{}{digits}", "0".repeat(p - digits.len())),
            _ => digits.to_string(),
        }
    }

    fn pad(&self, body: String, conversion: char) -> String {
        let width = self.width.unwrap_or(0);
        let len = body.chars().count();
        if len >= width {
            return body;
        }
        let fill = width - len;
        let numeric = !matches!(conversion, 's' | 'r' | 'a' | 'c');
        if self.left_align {
            format!("{body}{}", " ".repeat(fill))
        } else if self.zero_pad && numeric {
            // Zeros go after the sign and any `0x`/`0o` prefix.
            let (sign, rest) = match body.chars().next() {
                Some('+' | ' ') => body.split_at(1),
                _ => ("", body.as_str()),
            };
            let prefix_len = match conversion {
                'o' | 'x' | 'X' if self.alternate => 2,
                _ => 0,
            };
            let (prefix, digits) = rest.split_at(prefix_len);
            format!("{sign}{prefix}{}{digits}", "0".repeat(fill))
        } else {
            format!("{}{body}", " ".repeat(fill))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(
        use_periods: bool,
        ep: usize,
        sep: usize,
        use_quality: bool,
        use_show_name: bool,
        use_episode_name: bool,
    ) -> LegacyNaming {
        LegacyNaming {
            use_periods,
            episode_style: EpisodeStyle::ALL[ep],
            separator: Separator::ALL[sep],
            use_quality,
            use_show_name,
            use_episode_name,
        }
    }

    #[test]
    fn lower_se_with_show_and_episode_names() {
        let naming = legacy(false, 1, 0, false, true, true);
        assert_eq!(naming.to_pattern(false), "%SN - s%0Se%0E - %EN");
    }

    #[test]
    fn defaults_give_classic_pattern() {
        assert_eq!(LegacyNaming::default().to_pattern(false), "%SN - %Sx%0E - %EN");
    }

    #[test]
    fn periods_collapse_whitespace() {
        let naming = legacy(true, 2, 0, true, true, true);
        assert_eq!(naming.to_pattern(false), "%S.N.-.S%0SE%0E.-.%E.N.-.%Q.N");
        let naming = legacy(true, 2, 1, true, true, true);
        assert_eq!(naming.to_pattern(false), "%S.N.S%0SE%0E.%E.N.%Q.N");
    }

    #[test]
    fn air_by_date_token_replaces_numbering() {
        let naming = legacy(false, 3, 1, false, true, true);
        assert_eq!(naming.to_pattern(true), "%SN %A-D %EN");
        let naming = legacy(true, 3, 1, false, true, false);
        assert_eq!(naming.to_pattern(true), "%S.N.%A.D");
    }

    #[test]
    fn numbering_alone_has_no_separator_artifacts() {
        let naming = legacy(false, 0, 0, false, false, false);
        assert_eq!(naming.to_pattern(false), "%Sx%0E");
    }

    #[test]
    fn quality_without_episode_name() {
        let naming = legacy(false, 3, 0, true, false, false);
        assert_eq!(naming.to_pattern(false), "%0Sx%0E - %QN");
    }

    #[test]
    fn every_combination_is_deterministic_and_well_formed() {
        for ep in 0..4 {
            for sep in 0..2 {
                for bits in 0..32u8 {
                    let naming = legacy(
                        bits & 1 != 0,
                        ep,
                        sep,
                        bits & 2 != 0,
                        bits & 4 != 0,
                        bits & 8 != 0,
                    );
                    let abd = bits & 16 != 0;
                    let first = naming.to_pattern(abd);
                    assert_eq!(first, naming.to_pattern(abd));
                    assert!(!first.is_empty());
                    assert!(!first.starts_with(' ') && !first.ends_with(' '));
                    assert!(!first.starts_with(" - ") && !first.ends_with(" - "));
                    assert!(!first.starts_with('.') && !first.ends_with('.'));
                    if naming.use_periods {
                        assert!(!first.contains(char::is_whitespace));
                    }
                    assert!(!requires_season_folders(&first));
                }
            }
        }
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        assert_eq!(EpisodeStyle::from_index(4), None);
        assert_eq!(EpisodeStyle::from_index(-1), None);
        assert_eq!(EpisodeStyle::from_index(2), Some(EpisodeStyle::UpperSe));
        assert_eq!(Separator::from_index(2), None);
        assert_eq!(Separator::from_index(1), Some(Separator::Space));
    }

    #[test]
    fn season_format_zero_padded() {
        assert_eq!(season_folder_pattern("Season %02d").unwrap(), "Season %0S");
    }

    #[test]
    fn season_format_unpadded() {
        assert_eq!(season_folder_pattern("Season %d").unwrap(), "Season %S");
        assert_eq!(season_folder_pattern("S%i").unwrap(), "S%S");
    }

    #[test]
    fn season_format_wide_padding_keeps_extra_zero() {
        assert_eq!(season_folder_pattern("Season %03d").unwrap(), "Season 0%0S");
        assert_eq!(season_folder_pattern("Season %3d").unwrap(), "Season   %S");
    }

    #[test]
    fn season_format_zero_fill_follows_radix_prefix() {
        assert_eq!(season_folder_pattern("S%#05x").unwrap(), "S0x0%0S");
        assert_eq!(season_folder_pattern("S%#06o").unwrap(), "S0o0011");
        assert_eq!(season_folder_pattern("S%+#06X").unwrap(), "S+0X0%0S");
    }

    #[test]
    fn season_format_literal_nines_are_rewritten() {
        assert_eq!(
            season_folder_pattern("Season 1999 %02d").unwrap(),
            "Season 1%S%S%S %0S"
        );
    }

    #[test]
    fn season_format_percent_escape() {
        assert_eq!(season_folder_pattern("100%% S%d").unwrap(), "100% S%S");
    }

    #[test]
    fn season_format_precision_and_string() {
        assert_eq!(season_folder_pattern("S%.2d").unwrap(), "S%0S");
        assert_eq!(season_folder_pattern("Season %s").unwrap(), "Season %S");
    }

    #[test]
    fn season_format_errors() {
        assert_eq!(
            season_folder_pattern("Season"),
            Err(SeasonFormatError::NotAllArgumentsConverted)
        );
        assert_eq!(
            season_folder_pattern("%d-%d"),
            Err(SeasonFormatError::NotEnoughArguments)
        );
        assert_eq!(
            season_folder_pattern("Season %"),
            Err(SeasonFormatError::IncompleteFormat)
        );
        assert_eq!(
            season_folder_pattern("Season %q"),
            Err(SeasonFormatError::UnsupportedCharacter('q'))
        );
        assert_eq!(
            season_folder_pattern("%(season)d"),
            Err(SeasonFormatError::MappingRequired)
        );
    }

    #[test]
    fn folder_requirement_checks_file_part_only() {
        assert!(!requires_season_folders("%SN - %Sx%0E - %EN"));
        assert!(!requires_season_folders("Season %0S/%SN - %A-D"));
        assert!(requires_season_folders("%SN - S%0S/%0E - %EN"));
        assert!(requires_season_folders("%SN - %EN"));
        assert!(requires_season_folders("%S.N.%E.N"));
    }
}
