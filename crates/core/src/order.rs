//! Order summary and the WhatsApp order message.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::cart::{CartLine, cart_total, line_subtotal};
use crate::types::{PaymentMethod, Price};

/// Checkout-time projection of the cart. Never persisted.
#[derive(Debug, Clone, Copy)]
pub struct OrderSummary<'a> {
    pub store_name: &'a str,
    pub lines: &'a [CartLine],
    pub payment_method: &'a PaymentMethod,
}

impl<'a> OrderSummary<'a> {
    #[must_use]
    pub const fn new(
        store_name: &'a str,
        lines: &'a [CartLine],
        payment_method: &'a PaymentMethod,
    ) -> Self {
        Self {
            store_name,
            lines,
            payment_method,
        }
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        cart_total(self.lines)
    }

    /// The human-readable order text.
    #[must_use]
    pub fn message(&self) -> String {
        let mut message = format!("🛍️ *NUEVO PEDIDO - {}*\n\n📦 *Productos:*\n", self.store_name);

        for (index, line) in self.lines.iter().enumerate() {
            // Writing to a String cannot fail.
            let _ = write!(
                message,
                "\n{}. {}\n   • Cantidad: {}\n   • Talle: {}\n   • Color: {}\n   • Precio unitario: {}\n   • Subtotal: {}\n",
                index + 1,
                line.product.name,
                line.quantity,
                line.size,
                line.color,
                Price::new(line.unit_price()),
                Price::new(line_subtotal(line)),
            );
        }

        let _ = write!(
            message,
            "\n💰 *Total: {}*\n\n💳 *Método de pago:* {}\n",
            Price::new(self.total()),
            self.payment_method.name,
        );
        if !self.payment_method.is_cash() {
            let _ = writeln!(message, "📝 {}", self.payment_method.description);
        }
        message.push_str("\n✅ Confirmo el pedido y espero coordinar la entrega. ¡Gracias!");
        message
    }

    /// The order text, percent-encoded for use as a URL query value.
    #[must_use]
    pub fn encoded_message(&self) -> String {
        urlencoding::encode(&self.message()).into_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::types::{PriceSchedule, Product, ProductFields, ProductId, StoreSettings};

    fn product(id: u32, name: &str, unit: i64, wholesale: i64, bulk: i64) -> Product {
        Product::from_fields(
            ProductId::Seed(id),
            ProductFields {
                name: name.to_owned(),
                description: String::new(),
                image: String::new(),
                category: "conjuntos".to_owned(),
                sizes: vec![],
                colors: vec![],
                stock: 50,
                pricing: PriceSchedule::new(
                    Decimal::from(unit),
                    Decimal::from(wholesale),
                    Decimal::from(bulk),
                ),
            },
        )
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_line(
            &product(1, "Conjunto de Encaje Clásico", 2500, 2200, 2000),
            "M",
            "Negro",
            8,
        );
        cart.add_line(&product(3, "Bombacha Colaless", 800, 700, 600), "S", "Rosa", 1);
        cart
    }

    #[test]
    fn test_message_format_with_transfer_details() {
        let settings = StoreSettings::default();
        let method = settings
            .select_payment_method(Some("transferencia"))
            .unwrap();
        let cart = cart();
        let summary = OrderSummary::new("SIMEA", cart.lines(), method);

        let expected = "🛍️ *NUEVO PEDIDO - SIMEA*\n\
\n\
📦 *Productos:*\n\
\n\
1. Conjunto de Encaje Clásico\n   • Cantidad: 8\n   • Talle: M\n   • Color: Negro\n   • Precio unitario: $\u{a0}2.200\n   • Subtotal: $\u{a0}17.600\n\
\n\
2. Bombacha Colaless\n   • Cantidad: 1\n   • Talle: S\n   • Color: Rosa\n   • Precio unitario: $\u{a0}800\n   • Subtotal: $\u{a0}800\n\
\n\
💰 *Total: $\u{a0}18.400*\n\
\n\
💳 *Método de pago:* Transferencia Bancaria\n\
📝 CBU: 0000003100012345678901 - Banco Nación\n\
\n\
✅ Confirmo el pedido y espero coordinar la entrega. ¡Gracias!";

        assert_eq!(summary.message(), expected);
    }

    #[test]
    fn test_cash_omits_description() {
        let settings = StoreSettings::default();
        let cash = &settings.payment_methods[0];
        let cart = cart();
        let message = OrderSummary::new("SIMEA", cart.lines(), cash).message();

        assert!(message.contains("💳 *Método de pago:* Efectivo\n\n✅"));
        assert!(!message.contains("📝"));
    }

    #[test]
    fn test_encoded_message_is_url_safe() {
        let settings = StoreSettings::default();
        let cart = cart();
        let encoded =
            OrderSummary::new("SIMEA", cart.lines(), &settings.payment_methods[0]).encoded_message();

        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('\n'));
        assert!(encoded.starts_with("%F0%9F%9B%8D"));
        assert_eq!(
            urlencoding::decode(&encoded).map(std::borrow::Cow::into_owned).ok(),
            Some(OrderSummary::new("SIMEA", cart.lines(), &settings.payment_methods[0]).message())
        );
    }
}
