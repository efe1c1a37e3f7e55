use paygate::gateways::models::ORDER_ID_PREFIX;
use paygate::Invoice;
use proptest::prelude::*;

proptest! {
    #[test]
    fn order_id_is_prefixed_invoice_number(number in "[A-Za-z0-9-]{1,40}", amount in 1u64..=1_000_000_000) {
        let invoice = Invoice::new(number.clone(), amount, "Budi");
        prop_assert_eq!(invoice.order_id(), format!("INV-{}", number));
        prop_assert!(invoice.order_id().starts_with(ORDER_ID_PREFIX));
    }

    #[test]
    fn order_id_ignores_customer_details(
        number in "[0-9]{4}-[0-9]{3}",
        name in "[A-Za-z ]{1,20}",
        email in proptest::option::of("[a-z]{1,8}@[a-z]{1,8}\\.com"),
    ) {
        let mut invoice = Invoice::new(number.clone(), 150_000, name);
        invoice.customer_email = email;
        prop_assert_eq!(invoice.order_id(), format!("INV-{}", number));
    }
}

#[test]
fn order_id_for_known_invoice() {
    let invoice = Invoice::new("2024-001", 150_000, "Budi");
    assert_eq!(invoice.order_id(), "INV-2024-001");
}
