//! Brazilian-real budget parsing.
//!
//! Recognizes money mentions in free text ("800 mil", "R$ 1.200.000",
//! "1.5 milhão", "900k") and assembles them into a budget bound or range.
//! A mention counts as money only when it carries an "R$" prefix or a
//! magnitude suffix; bare digits are picked up solely by the keyword
//! fallback so bedroom and parking counts never leak into the budget.
//!
//! Separator rule: a lone dot before trailing 3-digit groups is a
//! thousands separator ("1.200.000"), unless a magnitude suffix follows,
//! in which case dot and comma are both decimal ("1.2 milhão").

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text;

/// Parsed budget bounds. `is_range` is true only when two distinct
/// monetary mentions were found, explicit marker or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub is_range: bool,
    pub raw_matches: Vec<String>,
    /// Set when the value came from the bare-digit keyword fallback rather
    /// than a real money mention; such values are low confidence.
    pub keyword_only: bool,
}

impl BudgetRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Magnitude {
    Million,
    Thousand,
    Unit,
}

#[derive(Debug, Clone)]
struct MoneyToken {
    start: usize,
    end: usize,
    value: i64,
    magnitude: Magnitude,
    /// The numeric fragment had no fractional part ("1" as opposed to "1.2").
    integral: bool,
}

static PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"r\$\s*(\d+(?:[.,]\d+)*)\s*(milhoes|milhao|mil|mi|m|k)?\b").unwrap()
});

static SUFFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+(?:[.,]\d+)*)\s*(milhoes|milhao|mil|mi|m|k)\b").unwrap());

static THOUSANDS_GROUPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(?:\.\d{3})+$").unwrap());

/// Budget keywords that let a bare number count as money.
static KEYWORD_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:ate|teto|maximo|max|orcamento|budget|limite|por mes|mensal)[^\d]{0,10}(\d+(?:[.,]\d+)*)",
    )
    .unwrap()
});

const MIN_MARKERS: [&str; 4] = ["a partir de", "acima de", "minimo", "pelo menos"];

fn magnitude_of(suffix: Option<&str>) -> Magnitude {
    match suffix {
        Some("milhoes") | Some("milhao") | Some("mi") | Some("m") => Magnitude::Million,
        Some("mil") | Some("k") => Magnitude::Thousand,
        _ => Magnitude::Unit,
    }
}

fn multiplier(magnitude: Magnitude) -> f64 {
    match magnitude {
        Magnitude::Million => 1_000_000.0,
        Magnitude::Thousand => 1_000.0,
        Magnitude::Unit => 1.0,
    }
}

/// Numeric fragment to f64, resolving the thousands/decimal ambiguity.
fn parse_fragment(fragment: &str, has_suffix: bool) -> Option<f64> {
    let cleaned = if THOUSANDS_GROUPED.is_match(fragment) && !has_suffix {
        fragment.replace('.', "")
    } else {
        fragment.replace(',', ".")
    };
    cleaned.parse::<f64>().ok()
}

fn token_from(captures: &regex::Captures<'_>, full_start: usize, full_end: usize) -> Option<MoneyToken> {
    let fragment = captures.get(1)?.as_str();
    let suffix = captures.get(2).map(|m| m.as_str());
    let base = parse_fragment(fragment, suffix.is_some())?;
    let magnitude = magnitude_of(suffix);
    let value = (base * multiplier(magnitude)).round() as i64;
    if value <= 0 {
        return None;
    }
    Some(MoneyToken {
        start: full_start,
        end: full_end,
        value,
        magnitude,
        integral: base.fract() == 0.0,
    })
}

fn scan_tokens(folded: &str) -> Vec<MoneyToken> {
    let mut tokens: Vec<MoneyToken> = Vec::new();
    for captures in PREFIXED.captures_iter(folded) {
        let whole = captures.get(0).map(|m| (m.start(), m.end()));
        if let Some((start, end)) = whole {
            if let Some(token) = token_from(&captures, start, end) {
                tokens.push(token);
            }
        }
    }
    for captures in SUFFIXED.captures_iter(folded) {
        let whole = captures.get(0).map(|m| (m.start(), m.end()));
        if let Some((start, end)) = whole {
            let overlaps = tokens.iter().any(|t| start < t.end && t.start < end);
            if overlaps {
                continue;
            }
            if let Some(token) = token_from(&captures, start, end) {
                tokens.push(token);
            }
        }
    }
    tokens.sort_by_key(|t| t.start);
    tokens
}

/// Sums "1 milhão e 200 mil" style compounds into one token. The merge
/// needs an integral million followed by " e " and a sub-million thousands
/// token; "1.2 milhão e 800 mil" stays two tokens because of the decimals,
/// and a two-token "entre" phrase is always a range, never a sum.
fn merge_compounds(folded: &str, tokens: Vec<MoneyToken>) -> Vec<MoneyToken> {
    if folded.contains("entre") && tokens.len() == 2 {
        return tokens;
    }
    let mut merged: Vec<MoneyToken> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if i + 1 < tokens.len() {
            let a = &tokens[i];
            let b = &tokens[i + 1];
            let connector = folded[a.end..b.start].trim();
            let compound = a.magnitude == Magnitude::Million
                && a.integral
                && b.magnitude == Magnitude::Thousand
                && b.value < 1_000_000
                && connector == "e";
            if compound {
                merged.push(MoneyToken {
                    start: a.start,
                    end: b.end,
                    value: a.value + b.value,
                    magnitude: Magnitude::Million,
                    integral: true,
                });
                i += 2;
                continue;
            }
        }
        merged.push(tokens[i].clone());
        i += 1;
    }
    merged
}

fn is_min_context(folded: &str, token_start: usize) -> bool {
    MIN_MARKERS
        .iter()
        .any(|marker| folded.find(marker).is_some_and(|pos| pos < token_start))
}

/// Extract budget bounds from one utterance. Never fails: unparseable
/// input yields an empty result.
pub fn parse_budget_range(utterance: &str) -> BudgetRange {
    let folded = text::fold(utterance);
    let tokens = merge_compounds(&folded, scan_tokens(&folded));

    match tokens.len() {
        0 => keyword_fallback(&folded),
        1 => {
            let token = &tokens[0];
            let raw = folded[token.start..token.end].to_string();
            if is_min_context(&folded, token.start) {
                BudgetRange {
                    min: Some(token.value),
                    max: None,
                    is_range: false,
                    raw_matches: vec![raw],
                    keyword_only: false,
                }
            } else {
                // Legacy bias: an unqualified single mention is a ceiling.
                BudgetRange {
                    min: None,
                    max: Some(token.value),
                    is_range: false,
                    raw_matches: vec![raw],
                    keyword_only: false,
                }
            }
        }
        _ => {
            let lo = tokens.iter().map(|t| t.value).min();
            let hi = tokens.iter().map(|t| t.value).max();
            BudgetRange {
                min: lo,
                max: hi,
                is_range: true,
                raw_matches: tokens
                    .iter()
                    .map(|t| folded[t.start..t.end].to_string())
                    .collect(),
                keyword_only: false,
            }
        }
    }
}

/// Bare digits after a budget keyword ("orçamento 500000"). Values under
/// 100 are discarded so "até 3 quartos" never becomes a budget.
fn keyword_fallback(folded: &str) -> BudgetRange {
    if let Some(captures) = KEYWORD_FALLBACK.captures(folded) {
        let fragment = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        if let Some(base) = parse_fragment(fragment, false) {
            let value = base.round() as i64;
            if value >= 100 {
                let raw = captures
                    .get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                return BudgetRange {
                    min: None,
                    max: Some(value),
                    is_range: false,
                    raw_matches: vec![raw],
                    keyword_only: true,
                };
            }
        }
    }
    BudgetRange::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_entre_with_compound_upper_bound() {
        let result = parse_budget_range("entre 800 mil a 1 milhão e 200 mil");
        assert_eq!(result.min, Some(800_000));
        assert_eq!(result.max, Some(1_200_000));
        assert!(result.is_range);
    }

    #[test]
    fn range_de_x_a_y_with_short_suffixes() {
        let result = parse_budget_range("de 900k a 1.1m");
        assert_eq!(result.min, Some(900_000));
        assert_eq!(result.max, Some(1_100_000));
        assert!(result.is_range);
    }

    #[test]
    fn range_x_a_y() {
        let result = parse_budget_range("800 mil a 1 milhão");
        assert_eq!(result.min, Some(800_000));
        assert_eq!(result.max, Some(1_000_000));
        assert!(result.is_range);
    }

    #[test]
    fn range_x_ate_y() {
        let result = parse_budget_range("700 mil até 1.2 milhão");
        assert_eq!(result.min, Some(700_000));
        assert_eq!(result.max, Some(1_200_000));
        assert!(result.is_range);
    }

    #[test]
    fn range_with_dash() {
        let result = parse_budget_range("900 mil - 1.5 milhão");
        assert_eq!(result.min, Some(900_000));
        assert_eq!(result.max, Some(1_500_000));
        assert!(result.is_range);
    }

    #[test]
    fn range_with_tilde() {
        let result = parse_budget_range("850k ~ 1.2m");
        assert_eq!(result.min, Some(850_000));
        assert_eq!(result.max, Some(1_200_000));
        assert!(result.is_range);
    }

    #[test]
    fn inverted_range_is_sorted() {
        let result = parse_budget_range("entre 1.2 milhão e 800 mil");
        assert_eq!(result.min, Some(800_000));
        assert_eq!(result.max, Some(1_200_000));
        assert!(result.is_range);
    }

    #[test]
    fn ate_is_max_only() {
        let result = parse_budget_range("até 1 milhão");
        assert_eq!(result.min, None);
        assert_eq!(result.max, Some(1_000_000));
        assert!(!result.is_range);
    }

    #[test]
    fn maximo_is_max_only() {
        let result = parse_budget_range("máximo 900k");
        assert_eq!(result.min, None);
        assert_eq!(result.max, Some(900_000));
        assert!(!result.is_range);
    }

    #[test]
    fn teto_is_max_only() {
        let result = parse_budget_range("teto de 1.5 milhão");
        assert_eq!(result.min, None);
        assert_eq!(result.max, Some(1_500_000));
        assert!(!result.is_range);
    }

    #[test]
    fn a_partir_de_is_min_only() {
        let result = parse_budget_range("a partir de 700 mil");
        assert_eq!(result.min, Some(700_000));
        assert_eq!(result.max, None);
        assert!(!result.is_range);
    }

    #[test]
    fn minimo_is_min_only() {
        let result = parse_budget_range("mínimo 800 mil");
        assert_eq!(result.min, Some(800_000));
        assert_eq!(result.max, None);
        assert!(!result.is_range);
    }

    #[test]
    fn pelo_menos_is_min_only() {
        let result = parse_budget_range("pelo menos 600k");
        assert_eq!(result.min, Some(600_000));
        assert_eq!(result.max, None);
        assert!(!result.is_range);
    }

    #[test]
    fn grouped_digits_with_currency_prefix() {
        let result = parse_budget_range("R$ 1.200.000");
        assert_eq!(result.min, None);
        assert_eq!(result.max, Some(1_200_000));
        assert!(!result.is_range);
    }

    #[test]
    fn single_unqualified_value_is_max() {
        let result = parse_budget_range("900 mil");
        assert_eq!(result.min, None);
        assert_eq!(result.max, Some(900_000));
        assert!(!result.is_range);
    }

    #[test]
    fn two_mentions_without_marker_form_implicit_range() {
        let result = parse_budget_range("busco algo por 800 mil mas aceito até 1 milhão");
        assert_eq!(result.min, Some(800_000));
        assert_eq!(result.max, Some(1_000_000));
        assert!(result.is_range);
    }

    #[test]
    fn no_money_yields_empty() {
        let result = parse_budget_range("Quero um apartamento em Manaíra");
        assert_eq!(result.min, None);
        assert_eq!(result.max, None);
        assert!(!result.is_range);
        assert!(result.raw_matches.is_empty());
    }

    #[test]
    fn compound_sum_needs_integral_million() {
        // decimals on the million token mean two values, not a sum
        let result = parse_budget_range("1.2 milhão e 800 mil");
        assert_eq!(result.min, Some(800_000));
        assert_eq!(result.max, Some(1_200_000));
        assert!(result.is_range);

        let result = parse_budget_range("1 milhão e 200 mil");
        assert_eq!(result.max, Some(1_200_000));
        assert!(!result.is_range);
    }

    #[test]
    fn bedroom_counts_are_not_money() {
        let result = parse_budget_range("3 quartos e 2 vagas");
        assert!(result.is_empty());
        assert!(result.raw_matches.is_empty());

        // "até 3 quartos" must not turn 3 into a budget
        let result = parse_budget_range("até 3 quartos");
        assert!(result.is_empty());
    }

    #[test]
    fn keyword_fallback_accepts_bare_digits() {
        let result = parse_budget_range("orçamento de 500000");
        assert_eq!(result.max, Some(500_000));
        assert!(!result.is_range);
        assert!(result.keyword_only);

        let real_mention = parse_budget_range("900 mil");
        assert!(!real_mention.keyword_only);
    }

    #[test]
    fn fragment_separator_disambiguation() {
        assert_eq!(parse_fragment("1.200.000", false), Some(1_200_000.0));
        assert_eq!(parse_fragment("1.200", false), Some(1_200.0));
        assert_eq!(parse_fragment("1.2", false), Some(1.2));
        assert_eq!(parse_fragment("1,5", true), Some(1.5));
        // suffix forces the separator to read as decimal
        assert_eq!(parse_fragment("1.200", true), Some(1.2));
        assert_eq!(parse_fragment("abc", false), None);
    }
}
