use crate::core::models::{Order, Product, Statistics};

use super::intent::Intent;
use super::pipeline::{ActOutput, ActResult};

pub const ERROR_PREFIX: &str = "❌ Ошибка: ";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Markdown-style table over a product list.
pub fn format_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "Ничего не найдено.".to_string();
    }

    let mut lines = Vec::with_capacity(products.len() + 2);
    lines.push("| ID | Название | Цена | Категория | В наличии |".to_string());
    lines.push("|---:|---|---:|---|:---:|".to_string());
    for p in products {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            p.id,
            p.name,
            p.price,
            p.category,
            if p.in_stock { "✅" } else { "❌" }
        ));
    }
    lines.join("\n")
}

pub fn format_statistics(stats: &Statistics) -> String {
    format!(
        "Всего продуктов: **{}**\nСредняя цена: **{}**",
        stats.count, stats.avg_price
    )
}

pub fn format_created(product: &Product) -> String {
    format!(
        "✅ Добавлен продукт: {} (ID {}), цена {}, категория {}",
        product.name, product.id, product.price, product.category
    )
}

pub fn format_discount(product: &Product, percent: f64, discounted_price: f64) -> String {
    format!(
        "Товар: **{}** (ID {})\nЦена: **{}**\nСкидка: **{}%**\nЦена со скидкой: **{}**",
        product.name,
        product.id,
        product.price,
        percent,
        round2(discounted_price)
    )
}

pub fn format_order(order: &Order) -> String {
    format!(
        "✅ Заказ создан (ID {})\n- Товар: {} (ID {})\n- Цена за штуку: {}\n- Количество: {}\n- Итог: {}\n- Время: {}",
        order.id,
        order.product_name,
        order.product_id,
        order.unit_price,
        order.quantity,
        order.total_price,
        order.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn format_help() -> String {
    [
        "Я умею:",
        "1) Показать продукты: `Покажи продукты`",
        "2) Фильтр по категории: `Покажи все продукты в категории Электроника`",
        "3) Статистика: `Какая средняя цена продуктов?`",
        "4) Добавить продукт: `Добавь новый продукт: Мышка, цена 1500, категория Электроника`",
        "5) Скидка: `Посчитай скидку 15% на товар с ID 1`",
        "6) Заказ (бонус): `Создай заказ: product_id 1 quantity 2`",
    ]
    .join("\n")
}

/// Final rendering stage: an error always wins and is reduced to one
/// prefixed line; otherwise the text shape follows the intent. Unexpected
/// intent/result combinations degrade to the help text.
pub fn render(intent: &Intent, output: &ActOutput) -> String {
    let result = match output {
        ActOutput::Failure(err) => return format!("{ERROR_PREFIX}{err}"),
        ActOutput::Success(result) => result,
    };

    match (intent, result) {
        (Intent::ListProducts | Intent::ListByCategory { .. }, ActResult::Products(products)) => {
            format_products(products)
        }
        (Intent::GetStatistics, ActResult::Statistics(stats)) => format_statistics(stats),
        (Intent::AddProduct { .. }, ActResult::Created(product)) => format_created(product),
        (
            Intent::DiscountById { .. },
            ActResult::Discount {
                product,
                percent,
                discounted_price,
            },
        ) => format_discount(product, *percent, *discounted_price),
        (Intent::CreateOrder { .. }, ActResult::Order(order)) => format_order(order),
        _ => format_help(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: 1,
            name: "Ноутбук".to_string(),
            price: 50000.0,
            category: "Электроника".to_string(),
            in_stock: true,
        }
    }

    #[test]
    fn test_empty_product_list() {
        assert_eq!(format_products(&[]), "Ничего не найдено.");
    }

    #[test]
    fn test_product_table_shape() {
        let text = format_products(&[product()]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Название"));
        assert!(lines[2].contains("Ноутбук"));
        assert!(lines[2].contains("✅"));
    }

    #[test]
    fn test_statistics_two_lines() {
        let text = format_statistics(&Statistics {
            count: 3,
            avg_price: 19400.0,
        });
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("**3**"));
    }

    #[test]
    fn test_discount_rounded_to_cents() {
        let text = format_discount(&product(), 15.0, 42500.004999);
        assert!(text.contains("**42500**"));
        assert!(text.contains("**15%**"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_error_wins_over_result() {
        let output = ActOutput::Failure("Product with id=9 not found".to_string());
        let text = render(&Intent::ListProducts, &output);
        assert_eq!(text, "❌ Ошибка: Product with id=9 not found");
    }

    #[test]
    fn test_help_for_unmatched_combination() {
        let text = render(&Intent::Help, &ActOutput::Success(ActResult::NoAction));
        assert!(text.starts_with("Я умею:"));
    }
}
