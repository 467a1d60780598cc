//! Merchant pattern extraction
//!
//! Bank descriptions carry store numbers, card-processor prefixes and
//! reference codes around the merchant name. Stripping those leaves a stable
//! pattern that recurs across transactions from the same merchant.

/// Card-processor and channel prefixes removed from the front of descriptions
const PROCESSOR_PREFIXES: &[&str] = &[
    "POS ",
    "SQ ",
    "TST ",
    "PAYPAL ",
    "SP ",
    "PP ",
    "DEBIT CARD PURCHASE ",
    "CARD PURCHASE ",
    "CHECKCARD ",
    "PURCHASE ",
    "RECURRING ",
];

/// Uppercase, drop digits, turn `*` and `#` into spaces, collapse whitespace
///
/// This is the text the rule tables are matched against.
pub fn clean_description(description: &str) -> String {
    description
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .map(|c| if c == '*' || c == '#' { ' ' } else { c })
        .collect::<String>()
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the merchant pattern from a transaction description
///
/// ```
/// use spendwise::categorize::extract_merchant_pattern;
/// assert_eq!(extract_merchant_pattern("SQ *BLUE BOTTLE 0423"), "BLUE BOTTLE");
/// assert_eq!(extract_merchant_pattern("POS 4411 Whole Foods #102"), "WHOLE FOODS");
/// ```
pub fn extract_merchant_pattern(description: &str) -> String {
    let mut pattern = clean_description(description);

    // Prefixes can stack ("POS SQ ..."); never strip down to nothing
    loop {
        let stripped = PROCESSOR_PREFIXES
            .iter()
            .find_map(|prefix| pattern.strip_prefix(prefix))
            .filter(|rest| !rest.trim().is_empty())
            .map(|rest| rest.trim_start().to_string());

        match stripped {
            Some(rest) => pattern = rest,
            None => break,
        }
    }

    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description("Uber *Eats 8005928996"), "UBER EATS");
        assert_eq!(clean_description("  amazon.com   amzn.com/bill "), "AMAZON.COM AMZN.COM/BILL");
        assert_eq!(clean_description("12345"), "");
    }

    #[test]
    fn test_strips_processor_prefixes() {
        assert_eq!(extract_merchant_pattern("TST* CHEZ PANISSE 00012"), "CHEZ PANISSE");
        assert_eq!(extract_merchant_pattern("PAYPAL *SPOTIFY"), "SPOTIFY");
        assert_eq!(extract_merchant_pattern("POS SQ *JOE'S PIZZA"), "JOE'S PIZZA");
    }

    #[test]
    fn test_same_merchant_same_pattern() {
        let a = extract_merchant_pattern("STARBUCKS STORE 10042 SEATTLE");
        let b = extract_merchant_pattern("Starbucks Store 2231 Seattle");
        assert_eq!(a, b);
        assert_eq!(a, "STARBUCKS STORE SEATTLE");
    }

    #[test]
    fn test_prefix_alone_is_kept() {
        assert_eq!(extract_merchant_pattern("PAYPAL"), "PAYPAL");
        assert_eq!(extract_merchant_pattern("POS 1234"), "POS");
        assert_eq!(extract_merchant_pattern(""), "");
    }
}
