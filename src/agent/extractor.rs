use lazy_static::lazy_static;
use regex::Regex;

use super::intent::Intent;

lazy_static! {
    static ref PRICE_RE: Regex =
        Regex::new(r"цен[аы]\s*[:=]?\s*([0-9]+(?:[.,][0-9]+)?)").unwrap();
    static ref PRICE_SPLIT_RE: Regex = Regex::new(r"цен[аы]\s*[:=]?\s*").unwrap();
    static ref CATEGORY_SPLIT_RE: Regex = Regex::new(r"категор(?:ии|ия)\s+").unwrap();
    static ref NAME_COLON_RE: Regex = Regex::new(r"(?:продукт|товар)\s*:\s*(.+)").unwrap();
    static ref NAME_BARE_RE: Regex = Regex::new(r"(?:продукт|товар)\s+(.+)").unwrap();
    static ref DISCOUNT_PERCENT_RE: Regex = Regex::new(r"скид\w*\s*(\d+)\s*%").unwrap();
    static ref PRODUCT_ID_RE: Regex = Regex::new(r"(?:id|айди)\s*(\d+)").unwrap();
    static ref ORDER_PRODUCT_RE: Regex =
        Regex::new(r"(?:product_id|id|товар|продукт)\s*(\d+)").unwrap();
    static ref ORDER_QUANTITY_RE: Regex = Regex::new(r"количеств[оа]\s*(\d+)").unwrap();
}

fn clean_tail(s: &str) -> &str {
    s.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
}

/// Accepts both "." and "," as decimal separator.
fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse().ok()
}

/// Take the text after the LAST "категория/категории" token, truncated at
/// the next comma. Repeated tokens ("категории категории X") therefore
/// extract the same value as a single one.
fn extract_category(normalized: &str) -> Option<String> {
    let parts: Vec<&str> = CATEGORY_SPLIT_RE.split(normalized).collect();
    if parts.len() < 2 {
        return None;
    }
    let tail = parts.last()?;
    let category = clean_tail(tail.split(',').next().unwrap_or(""));
    if category.is_empty() {
        None
    } else {
        Some(category.to_string())
    }
}

/// Name extraction for ADD_PRODUCT: prefer the "продукт: <name>" colon form,
/// fall back to bare "продукт <name>"; either way the candidate is cut
/// before any price mention or comma.
fn extract_name(normalized: &str) -> Option<String> {
    NAME_COLON_RE
        .captures(normalized)
        .or_else(|| NAME_BARE_RE.captures(normalized))
        .and_then(|caps| {
            let candidate = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let candidate = PRICE_SPLIT_RE.split(candidate).next().unwrap_or("");
            let name = clean_tail(candidate.split(',').next().unwrap_or(""));
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
}

/// Rule-based intent extraction over a normalized query. Rules are evaluated
/// in fixed precedence, first match wins. The add-product rule deliberately
/// falls through to the remaining rules when name, price or category cannot
/// all be extracted; a query no rule claims degrades to Help. Never fails.
pub fn extract_intent(normalized: &str) -> Intent {
    let q = normalized.trim();

    // 1) statistics / average price
    if (q.contains("средн") && q.contains("цен")) || q.contains("статист") {
        return Intent::GetStatistics;
    }

    // 2) add product; requires name, price and category all present,
    //    otherwise falls through (see module docs)
    if q.contains("добав") && (q.contains("продукт") || q.contains("товар")) {
        let in_stock = !q.contains("нет в наличии");
        let price = PRICE_RE
            .captures(q)
            .and_then(|caps| parse_decimal(&caps[1]));
        let category = extract_category(q);
        let name = extract_name(q);

        if let (Some(name), Some(price), Some(category)) = (name, price, category) {
            return Intent::AddProduct {
                name,
                price,
                category,
                in_stock,
            };
        }
    }

    // 3) discount by product id
    if q.contains("скид") && q.contains('%') && (q.contains("id") || q.contains("айди")) {
        let percent = DISCOUNT_PERCENT_RE
            .captures(q)
            .and_then(|caps| caps[1].parse::<u32>().ok());
        let product_id = PRODUCT_ID_RE
            .captures(q)
            .and_then(|caps| caps[1].parse::<i64>().ok());
        if let (Some(percent), Some(product_id)) = (percent, product_id) {
            return Intent::DiscountById {
                percent,
                product_id,
            };
        }
    }

    // 4) create order
    if q.contains("заказ") {
        let product_id = ORDER_PRODUCT_RE
            .captures(q)
            .and_then(|caps| caps[1].parse::<i64>().ok());
        let quantity = ORDER_QUANTITY_RE
            .captures(q)
            .and_then(|caps| caps[1].parse::<i64>().ok());
        if let (Some(product_id), Some(quantity)) = (product_id, quantity) {
            return Intent::CreateOrder {
                product_id,
                quantity,
            };
        }
    }

    // 5) list by category
    if q.contains("категор") {
        if let Some(category) = extract_category(q) {
            return Intent::ListByCategory { category };
        }
    }

    // 6) list all products
    if q.contains("покажи") && (q.contains("продукт") || q.contains("товар")) {
        return Intent::ListProducts;
    }

    Intent::Help
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::normalizer::normalize_query;

    fn extract(query: &str) -> Intent {
        extract_intent(&normalize_query(query))
    }

    #[test]
    fn test_unrecognized_query_is_help() {
        assert_eq!(extract("привет, как дела?"), Intent::Help);
        assert_eq!(extract(""), Intent::Help);
        assert_eq!(extract("what is the weather"), Intent::Help);
    }

    #[test]
    fn test_list_products_ru_and_en() {
        assert_eq!(extract("Покажи продукты"), Intent::ListProducts);
        assert_eq!(extract("show me items"), Intent::ListProducts);
    }

    #[test]
    fn test_list_by_category() {
        assert_eq!(
            extract("Покажи все продукты в категории Электроника"),
            Intent::ListByCategory {
                category: "электроника".to_string()
            }
        );
    }

    #[test]
    fn test_category_extraction_idempotent_under_repeats() {
        let once = extract("покажи категория x");
        let twice = extract("покажи категории категории x");
        assert_eq!(once, twice);
        assert_eq!(
            once,
            Intent::ListByCategory {
                category: "x".to_string()
            }
        );
    }

    #[test]
    fn test_statistics() {
        assert_eq!(extract("Какая средняя цена продуктов?"), Intent::GetStatistics);
        assert_eq!(extract("покажи статистику"), Intent::GetStatistics);
        assert_eq!(extract("avg price?"), Intent::GetStatistics);
    }

    #[test]
    fn test_add_product_full_form() {
        let intent = extract("Добавь новый продукт: Мышка, цена 1500, категория Электроника");
        assert_eq!(
            intent,
            Intent::AddProduct {
                name: "мышка".to_string(),
                price: 1500.0,
                category: "электроника".to_string(),
                in_stock: true,
            }
        );
    }

    #[test]
    fn test_add_product_decimal_separators_equivalent() {
        let dot = extract("добавь продукт: чай, цена 99.5, категория продукты");
        let comma = extract("добавь продукт: чай, цена 99,5, категория продукты");
        assert_eq!(dot, comma);
        match dot {
            Intent::AddProduct { price, .. } => assert_eq!(price, 99.5),
            other => panic!("expected add_product, got {:?}", other),
        }
    }

    #[test]
    fn test_add_product_out_of_stock_phrase() {
        let intent =
            extract("добавь товар: кофе, цена 1200, категория продукты, нет в наличии");
        match intent {
            Intent::AddProduct { in_stock, .. } => assert!(!in_stock),
            other => panic!("expected add_product, got {:?}", other),
        }
    }

    #[test]
    fn test_add_product_bare_name_fallback() {
        let intent = extract("добавь продукт мышка цена 1500 категория электроника");
        match intent {
            Intent::AddProduct { name, .. } => assert_eq!(name, "мышка"),
            other => panic!("expected add_product, got {:?}", other),
        }
    }

    #[test]
    fn test_add_product_missing_price_falls_through() {
        // no price: the add rule gives up and the category rule claims it
        let intent = extract("добавь продукт: мышка, категория электроника");
        assert_eq!(
            intent,
            Intent::ListByCategory {
                category: "электроника".to_string()
            }
        );
    }

    #[test]
    fn test_add_product_missing_category_falls_through_to_help() {
        let intent = extract("добавь продукт: мышка, цена 1500");
        assert_eq!(intent, Intent::Help);
    }

    #[test]
    fn test_discount_by_id() {
        assert_eq!(
            extract("Посчитай скидку 15% на товар с ID 1"),
            Intent::DiscountById {
                percent: 15,
                product_id: 1
            }
        );
    }

    #[test]
    fn test_discount_with_ru_id_keyword() {
        assert_eq!(
            extract("скидка 20% айди 3"),
            Intent::DiscountById {
                percent: 20,
                product_id: 3
            }
        );
    }

    #[test]
    fn test_create_order() {
        assert_eq!(
            extract("Создай заказ: product_id 1 quantity 2"),
            Intent::CreateOrder {
                product_id: 1,
                quantity: 2
            }
        );
    }

    #[test]
    fn test_order_without_quantity_falls_through_to_help() {
        assert_eq!(extract("создай заказ product_id 1"), Intent::Help);
    }
}
