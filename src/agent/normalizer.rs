use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Ordered keyword rewrites applied to a casefolded query. Only command
    /// keywords are rewritten; category values typed by the user are left
    /// untouched so the resolver can match them against live backend data.
    static ref KEYWORD_REWRITES: Vec<(Regex, &'static str)> = vec![
        // show/list
        (Regex::new(r"\bshow\s+me\b").unwrap(), "покажи"),
        (Regex::new(r"\bshow\b").unwrap(), "покажи"),
        (Regex::new(r"\blist\b").unwrap(), "покажи"),
        (Regex::new(r"\bdisplay\b").unwrap(), "покажи"),

        // products/items
        (Regex::new(r"\bproducts?\b").unwrap(), "продукт"),
        (Regex::new(r"\bitems?\b").unwrap(), "продукт"),

        // category (also short forms)
        (Regex::new(r"\bcategory\b").unwrap(), "категория"),
        (Regex::new(r"\bcat\b").unwrap(), "категория"),
        (Regex::new(r"\bкатег\b").unwrap(), "категория"),

        // add/create/new
        (Regex::new(r"\badd\b").unwrap(), "добавь"),
        (Regex::new(r"\bcreate\b").unwrap(), "создай"),
        (Regex::new(r"\bnew\b").unwrap(), "новый"),

        // price / average
        (Regex::new(r"\bprice\b").unwrap(), "цена"),
        (Regex::new(r"\bavg\b").unwrap(), "средняя"),
        (Regex::new(r"\baverage\b").unwrap(), "средняя"),

        // discount
        (Regex::new(r"\bdiscount\b").unwrap(), "скидка"),

        // order + quantity
        (Regex::new(r"\border\b").unwrap(), "заказ"),
        (Regex::new(r"\bquantity\b").unwrap(), "количество"),
        (Regex::new(r"\bqty\b").unwrap(), "количество"),

        // stock
        (Regex::new(r"\bin\s+stock\b").unwrap(), "в наличии"),
        (Regex::new(r"\bout\s+of\s+stock\b").unwrap(), "нет в наличии"),
    ];

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Rewrite a raw mixed RU/EN query into its canonical keyword form:
/// casefold, map recognized keyword variants to one canonical token each,
/// collapse whitespace. Pure and infallible.
pub fn normalize_query(query: &str) -> String {
    let mut normalized = query.to_lowercase();

    for (pattern, canonical) in KEYWORD_REWRITES.iter() {
        normalized = pattern.replace_all(&normalized, *canonical).into_owned();
    }

    WHITESPACE.replace_all(&normalized, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_keywords_rewritten() {
        assert_eq!(normalize_query("Show me products"), "покажи продукт");
        assert_eq!(normalize_query("list items"), "покажи продукт");
        assert_eq!(
            normalize_query("Add new product: Keyboard"),
            "добавь новый продукт: keyboard"
        );
    }

    #[test]
    fn test_category_values_untouched() {
        // only the keyword is rewritten, the value stays as typed
        assert_eq!(
            normalize_query("show products in category Electronics"),
            "покажи продукт in категория electronics"
        );
    }

    #[test]
    fn test_russian_query_casefolded_only() {
        assert_eq!(
            normalize_query("Покажи все продукты"),
            "покажи все продукты"
        );
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_query("  show   products  "), "покажи продукт");
    }

    #[test]
    fn test_stock_phrases() {
        assert_eq!(normalize_query("out of stock"), "нет в наличии");
        assert_eq!(normalize_query("in stock"), "в наличии");
    }

    #[test]
    fn test_short_category_form() {
        assert_eq!(normalize_query("cat Food"), "категория food");
    }

    #[test]
    fn test_product_id_token_not_rewritten() {
        // "product_id" has no word boundary before the underscore
        assert_eq!(
            normalize_query("order product_id 1 qty 2"),
            "заказ product_id 1 количество 2"
        );
    }
}
