//! End-to-end: booking an appointment through closing its order.

use chrono::NaiveDate;

use salon_backend::{Backend, ErrorCode, Session};
use salon_core::{
    ClientRef, Money, NewAppointment, OrderStatus, PaymentMethod, Product, Role, Service,
    StaffMember,
};

struct Salon {
    backend: Backend,
    stylist_x: String,
    product_50: String,
}

async fn salon() -> Salon {
    let backend = Backend::in_memory().await.unwrap();
    let catalog = backend.db.catalog();

    catalog
        .insert_service(&mut Service {
            id: String::new(),
            name: "Corte".to_string(),
            price: Money::from_quetzales(150),
            duration_minutes: Some(45),
            active: true,
        })
        .await
        .unwrap();
    let product_50 = catalog
        .insert_product(&mut Product {
            id: String::new(),
            name: "Shampoo".to_string(),
            price: Money::from_quetzales(50),
            stock: 12,
            category: Some("shampoo".to_string()),
            active: true,
        })
        .await
        .unwrap();
    let stylist_x = catalog
        .insert_user(&mut StaffMember {
            id: String::new(),
            name: "X".to_string(),
            role: Role::Stylist,
            phone: String::new(),
            active: true,
        })
        .await
        .unwrap();

    Salon {
        backend,
        stylist_x,
        product_50,
    }
}

fn ana_at_ten() -> NewAppointment {
    NewAppointment {
        client: ClientRef {
            id: None,
            name: "Ana".to_string(),
            phone: "5555-1234".to_string(),
        },
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        start_time: "10:00".to_string(),
        notes: String::new(),
    }
}

fn cashier() -> Session {
    Session::new("u-caja", "María", Role::Cashier)
}

#[tokio::test]
async fn book_edit_and_close_an_order() {
    let salon = salon().await;
    let backend = &salon.backend;

    let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
    let order = backend
        .orders
        .find_by_appointment(&booking.appointment.id)
        .await
        .unwrap()
        .expect("order created with the appointment");
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.order_number, 60288);
    assert!(order.totals.total.is_zero());
    assert!(order.totals.subtotal.is_zero());
    assert!(order.totals.total_tips.is_zero());

    let mut editor = backend
        .orders
        .open_for_edit(&cashier(), &order.id)
        .await
        .unwrap();

    editor.add_product(&salon.product_50, 2).unwrap();
    assert_eq!(editor.totals().subtotal_products, Money::from_quetzales(100));

    editor.assign_stylist(0, &salon.stylist_x).unwrap();
    assert!(editor.toggle_service(0).unwrap());
    assert_eq!(editor.totals().subtotal_services, Money::from_quetzales(150));

    editor.set_tip(&salon.stylist_x, "20").unwrap();
    assert_eq!(editor.totals().subtotal, Money::from_quetzales(250));
    assert_eq!(editor.totals().total_tips, Money::from_quetzales(20));
    assert_eq!(editor.totals().total, Money::from_quetzales(270));

    backend
        .orders
        .close(&mut editor, PaymentMethod::Cash, &cashier())
        .await
        .unwrap();

    let stored = backend.orders.get(&order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Closed);
    assert!(stored.paid);
    assert_eq!(stored.payment_method, Some(PaymentMethod::Cash));
    assert_eq!(stored.totals.total, Money::from_quetzales(270));
    assert_eq!(stored.closed_by.as_deref(), Some("u-caja"));
    assert!(stored.closed_at.is_some());
}

#[tokio::test]
async fn close_then_reopen_keeps_lines_and_totals() {
    let salon = salon().await;
    let backend = &salon.backend;

    let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
    let mut editor = backend
        .orders
        .open_for_edit(&cashier(), &booking.order.id)
        .await
        .unwrap();
    editor.add_product(&salon.product_50, 1).unwrap();
    backend
        .orders
        .close(&mut editor, PaymentMethod::Card, &cashier())
        .await
        .unwrap();
    let closed = backend.orders.get(&booking.order.id).await.unwrap();

    let owner = Session::new("u-owner", "Juan", Role::Owner);
    let reopened = backend
        .orders
        .reopen(&owner, &booking.order.id)
        .await
        .unwrap();
    assert_eq!(reopened.status, OrderStatus::Open);
    assert_eq!(reopened.products, closed.products);
    assert_eq!(reopened.services, closed.services);
    assert_eq!(reopened.tips, closed.tips);
    assert_eq!(reopened.totals, closed.totals);

    // the reopened order can be edited and closed again
    let mut editor = backend
        .orders
        .open_for_edit(&cashier(), &booking.order.id)
        .await
        .unwrap();
    editor.add_product(&salon.product_50, 1).unwrap();
    backend
        .orders
        .close(&mut editor, PaymentMethod::Cash, &cashier())
        .await
        .unwrap();
    let again = backend.orders.get(&booking.order.id).await.unwrap();
    assert_eq!(again.totals.total, Money::from_quetzales(100));
    assert_eq!(again.payment_method, Some(PaymentMethod::Cash));
}

#[tokio::test]
async fn empty_order_cannot_be_closed() {
    let salon = salon().await;
    let backend = &salon.backend;

    let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
    let mut editor = backend
        .orders
        .open_for_edit(&cashier(), &booking.order.id)
        .await
        .unwrap();

    let err = backend
        .orders
        .close(&mut editor, PaymentMethod::Cash, &cashier())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(
        backend.orders.get(&booking.order.id).await.unwrap().status,
        OrderStatus::Open
    );
}

#[tokio::test]
async fn order_numbers_increase() {
    let salon = salon().await;
    let backend = &salon.backend;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
        numbers.push(booking.order.order_number);
    }
    assert_eq!(numbers, vec![60288, 60289, 60290]);
}

#[tokio::test]
async fn deleting_an_appointment_removes_its_order() {
    let salon = salon().await;
    let backend = &salon.backend;

    let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
    backend
        .appointments
        .delete(&booking.appointment.id)
        .await
        .unwrap();

    let err = backend.orders.get(&booking.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(backend
        .appointments
        .list_by_date(ana_at_ten().date)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn cancelling_an_appointment_removes_its_order() {
    let salon = salon().await;
    let backend = &salon.backend;

    let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
    backend
        .appointments
        .cancel(&booking.appointment.id)
        .await
        .unwrap();

    assert!(backend
        .orders
        .find_by_appointment(&booking.appointment.id)
        .await
        .unwrap()
        .is_none());
    let kept = backend.appointments.get(&booking.appointment.id).await.unwrap();
    assert_eq!(kept.status.as_str(), "cancelled");
}

#[tokio::test]
async fn sold_package_credits_are_granted_then_redeemed() {
    let salon = salon().await;
    let backend = &salon.backend;
    let catalog = backend.db.catalog();
    let service = catalog.active_services().await.unwrap().remove(0);
    let package_id = catalog
        .insert_package(&mut salon_core::Package {
            id: String::new(),
            name: "Cortes x1".to_string(),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            quantity: 1,
            price: Money::from_quetzales(140),
            active: true,
        })
        .await
        .unwrap();

    let client = ClientRef {
        id: Some("c-ana".to_string()),
        name: "Ana".to_string(),
        phone: String::new(),
    };
    let mut form = ana_at_ten();
    form.client = client;
    let booking = backend.appointments.book(form).await.unwrap();

    let mut editor = backend
        .orders
        .open_for_edit(&cashier(), &booking.order.id)
        .await
        .unwrap();
    editor.add_package(&package_id, 1).unwrap();
    backend
        .orders
        .close(&mut editor, PaymentMethod::Cash, &cashier())
        .await
        .unwrap();
    assert!(backend.packages.list_active("c-ana").await.unwrap().is_empty());

    let entry = backend
        .packages
        .grant_from_sale_line(&booking.order.id, 0)
        .await
        .unwrap();
    assert_eq!(entry.client_id, "c-ana");
    assert_eq!(backend.packages.list_active("c-ana").await.unwrap().len(), 1);

    // the same sale cannot be granted again
    let err = backend
        .packages
        .grant_from_sale_line(&booking.order.id, 0)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BusinessLogic);
    assert_eq!(backend.packages.list_for_client("c-ana").await.unwrap().len(), 1);

    let used = backend.packages.redeem(&entry.id).await.unwrap();
    assert_eq!(used.remaining, 0);
    let err = backend.packages.redeem(&entry.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::BusinessLogic);
}

#[tokio::test]
async fn deselected_stylist_loses_the_tip() {
    let salon = salon().await;
    let backend = &salon.backend;

    let booking = backend.appointments.book(ana_at_ten()).await.unwrap();
    let mut editor = backend
        .orders
        .open_for_edit(&cashier(), &booking.order.id)
        .await
        .unwrap();
    editor.assign_stylist(0, &salon.stylist_x).unwrap();
    editor.toggle_service(0).unwrap();
    editor.set_tip(&salon.stylist_x, "20").unwrap();

    assert!(!editor.toggle_service(0).unwrap());
    assert!(editor.tip_candidates().is_empty());
    assert!(editor.order().tips.is_empty());
    assert!(editor.totals().total.is_zero());

    let err = backend
        .orders
        .close(&mut editor, PaymentMethod::Cash, &cashier())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(
        backend.orders.get(&booking.order.id).await.unwrap().status,
        OrderStatus::Open
    );
}
