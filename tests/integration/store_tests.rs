//! Database-backed store tests
//!
//! Each test gets a fresh database with migrations applied.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use checkout_server::{
    config::AuthorizationConfig,
    models::{
        equipment::{Equipment, EquipmentStatus},
        reservation::CreateReservation,
        user::Subject,
    },
    repository::{equipment::EquipmentRepository, Repository},
    services::Services,
    AppError,
};
use sqlx::PgPool;
use std::time::Duration;

const STAFF: Subject = Subject { user_id: 5, pid: 888888888 };
const USER: Subject = Subject { user_id: 6, pid: 111111111 };

fn equipment(id: i32, name: &str, equipment_type: &str, status: EquipmentStatus, notes: &str) -> Equipment {
    Equipment {
        id: Some(id),
        name: name.to_string(),
        equipment_type: equipment_type.to_string(),
        status,
        notes: notes.to_string(),
    }
}

fn inventory() -> Vec<Equipment> {
    use EquipmentStatus::*;
    vec![
        equipment(1, "Asus", "monitor", Available, ""),
        equipment(2, "Dell", "monitor", Available, ""),
        equipment(3, "Logitech", "keyboard", Unavailable, "f key broken"),
        equipment(4, "Sony", "camera", Available, ""),
        equipment(5, "Lenovo", "laptop", Available, "has a short battery life"),
        equipment(6, "Lenovo", "Laptop", Available, ""),
    ]
}

async fn seed(pool: &PgPool) -> Services {
    sqlx::query(
        r#"
        INSERT INTO users (id, pid, onyen, first_name, last_name, email, pronouns) VALUES
            (1, 999999999, 'root', 'Super', 'User', 'root@cs.unc.edu', 'they / them'),
            (2, 100000000, 'sol', 'Sol', 'Student', 'sol@unc.edu', 'they / them'),
            (5, 888888888, 'staff', '', '', 'staff@unc.edu', ''),
            (6, 111111111, 'user', '', '', 'user@unc.edu', '')
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query("INSERT INTO roles (id, name) VALUES (1, 'staff')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (5, 1)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO permissions (action, resource, role_id) VALUES
            ('equipment.*', 'equipment/*', 1),
            ('reservation.*', 'reservation/*', 1)
        "#,
    )
    .execute(pool)
    .await
    .unwrap();

    let services = Services::new(Repository::new(pool.clone()), AuthorizationConfig::default());
    for item in inventory() {
        services.equipment.add(&item, Some(&STAFF)).await.unwrap();
    }
    services
}

fn checkout_request(user_id: i32, equipment_id: i32) -> CreateReservation {
    CreateReservation {
        user_id,
        equipment_id,
        notes: None,
    }
}

async fn status_of(services: &Services, id: i32) -> EquipmentStatus {
    services
        .equipment
        .get(id, None)
        .await
        .unwrap()
        .expect("equipment exists")
        .status
}

#[sqlx::test]
#[ignore]
async fn added_equipment_reads_back_equal(pool: PgPool) {
    let services = seed(&pool).await;
    let laptop = equipment(7, "Apple", "laptop", EquipmentStatus::Available, "");

    services.equipment.add(&laptop, Some(&STAFF)).await.unwrap();

    assert_eq!(services.equipment.get(7, None).await.unwrap(), Some(laptop));
}

#[sqlx::test]
#[ignore]
async fn generated_ids_skip_explicit_ones(pool: PgPool) {
    let services = seed(&pool).await;
    let mut mouse = equipment(0, "Razer", "mouse", EquipmentStatus::Available, "");
    mouse.id = None;

    let created = services.equipment.add(&mouse, Some(&STAFF)).await.unwrap();
    assert_eq!(created.id, Some(7));
}

#[sqlx::test]
#[ignore]
async fn duplicate_id_is_a_conflict(pool: PgPool) {
    let services = seed(&pool).await;
    let err = services
        .equipment
        .add(&inventory()[0], Some(&STAFF))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[sqlx::test]
#[ignore]
async fn type_filter_is_case_insensitive_and_stable(pool: PgPool) {
    let services = seed(&pool).await;
    let expected = vec![inventory()[4].clone(), inventory()[5].clone()];

    let first = services.equipment.filter_by_type("LAPTOP", None).await.unwrap();
    let second = services.equipment.filter_by_type("laptop", None).await.unwrap();

    assert_eq!(first, expected);
    assert_eq!(second, first);
    assert!(services.equipment.filter_by_type("lap%", None).await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore]
async fn status_filter_and_list(pool: PgPool) {
    let services = seed(&pool).await;

    let unavailable = services
        .equipment
        .filter_by_status(EquipmentStatus::Unavailable, None)
        .await
        .unwrap();
    assert_eq!(unavailable, vec![inventory()[2].clone()]);

    assert_eq!(services.equipment.list(None).await.unwrap(), inventory());
}

#[sqlx::test]
#[ignore]
async fn update_persists_and_unknown_id_changes_nothing(pool: PgPool) {
    let services = seed(&pool).await;

    let mut keyboard = inventory()[2].clone();
    keyboard.name = "Razer".to_string();
    let updated = services.equipment.update(&keyboard, Some(&STAFF)).await.unwrap();
    assert_eq!(updated, Some(keyboard.clone()));
    assert_eq!(services.equipment.get(3, None).await.unwrap(), Some(keyboard));

    let before = services.equipment.list(None).await.unwrap();
    let tv = equipment(8, "Sony", "TV", EquipmentStatus::Available, "");
    assert_eq!(services.equipment.update(&tv, Some(&STAFF)).await.unwrap(), None);
    assert_eq!(services.equipment.list(None).await.unwrap(), before);
}

#[sqlx::test]
#[ignore]
async fn subject_without_grants_changes_nothing(pool: PgPool) {
    let services = seed(&pool).await;
    let before = services.equipment.list(None).await.unwrap();

    let mut keyboard = inventory()[2].clone();
    keyboard.name = "Razer".to_string();
    let laptop = equipment(7, "Apple", "laptop", EquipmentStatus::Available, "");

    for err in [
        services.equipment.update(&keyboard, Some(&USER)).await.unwrap_err(),
        services.equipment.add(&laptop, Some(&USER)).await.unwrap_err(),
        services.equipment.remove(1, Some(&USER)).await.unwrap_err(),
    ] {
        assert!(matches!(err, AppError::PermissionDenied { .. }));
    }

    assert_eq!(services.equipment.list(None).await.unwrap(), before);
}

#[sqlx::test]
#[ignore]
async fn remove_deletes_and_missing_id_is_silent(pool: PgPool) {
    let services = seed(&pool).await;

    services.equipment.remove(1, Some(&STAFF)).await.unwrap();
    assert_eq!(services.equipment.get(1, None).await.unwrap(), None);

    services.equipment.remove(7, Some(&STAFF)).await.unwrap();
    assert_eq!(services.equipment.list(None).await.unwrap().len(), 5);
}

#[sqlx::test]
#[ignore]
async fn reservation_lifecycle_moves_equipment_status(pool: PgPool) {
    let services = seed(&pool).await;
    assert_eq!(status_of(&services, 1).await, EquipmentStatus::Available);

    let reservation = services
        .reservations
        .add(&checkout_request(1, 1), None)
        .await
        .unwrap();
    assert_eq!(reservation.reservation_type, "monitor");
    assert_eq!(reservation.user.pid, 999999999);
    assert_eq!(status_of(&services, 1).await, EquipmentStatus::Unavailable);

    let removed = services
        .reservations
        .remove(reservation.id, None)
        .await
        .unwrap()
        .expect("reservation existed");
    assert_eq!(removed.equipment.status, EquipmentStatus::Available);
    assert_eq!(status_of(&services, 1).await, EquipmentStatus::Available);
    assert!(services.reservations.get(reservation.id, None).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn removing_unknown_reservation_changes_nothing(pool: PgPool) {
    let services = seed(&pool).await;
    services.reservations.add(&checkout_request(2, 4), None).await.unwrap();

    let before = services.reservations.list(None).await.unwrap();
    assert!(services.reservations.remove(9999, None).await.unwrap().is_none());
    assert_eq!(services.reservations.list(None).await.unwrap(), before);
    assert_eq!(status_of(&services, 4).await, EquipmentStatus::Unavailable);
}

#[sqlx::test]
#[ignore]
async fn second_checkout_of_same_equipment_conflicts(pool: PgPool) {
    let services = seed(&pool).await;
    services.reservations.add(&checkout_request(1, 2), None).await.unwrap();

    let err = services
        .reservations
        .add(&checkout_request(2, 2), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(services.reservations.list(None).await.unwrap().len(), 1);
    assert_eq!(status_of(&services, 2).await, EquipmentStatus::Unavailable);
}

#[sqlx::test]
#[ignore]
async fn concurrent_checkouts_admit_exactly_one(pool: PgPool) {
    let services = seed(&pool).await;
    let a = checkout_request(1, 4);
    let b = checkout_request(2, 4);

    let (first, second) = tokio::join!(
        services.reservations.add(&a, None),
        services.reservations.add(&b, None),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    assert_eq!(services.reservations.list(None).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore]
async fn failed_reservation_insert_leaves_equipment_available(pool: PgPool) {
    let services = seed(&pool).await;

    let err = services
        .reservations
        .add(&checkout_request(42, 5), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(status_of(&services, 5).await, EquipmentStatus::Available);
}

#[sqlx::test]
#[ignore]
async fn checkout_of_missing_equipment_is_not_found(pool: PgPool) {
    let services = seed(&pool).await;
    let err = services
        .reservations
        .add(&checkout_request(1, 99), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test]
#[ignore]
async fn held_equipment_cannot_be_marked_available(pool: PgPool) {
    let services = seed(&pool).await;
    services.reservations.add(&checkout_request(1, 1), None).await.unwrap();

    let mut monitor = inventory()[0].clone();
    monitor.status = EquipmentStatus::Available;
    let err = services
        .equipment
        .update(&monitor, Some(&STAFF))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(status_of(&services, 1).await, EquipmentStatus::Unavailable);
}

#[sqlx::test]
#[ignore]
async fn reservation_filters(pool: PgPool) {
    let services = seed(&pool).await;
    let monitor = services.reservations.add(&checkout_request(1, 1), None).await.unwrap();
    services.reservations.add(&checkout_request(2, 3), None).await.unwrap_err();
    let camera = services.reservations.add(&checkout_request(2, 4), None).await.unwrap();

    let by_type = services
        .reservations
        .filter_by_type("MONITOR", Some(&STAFF))
        .await
        .unwrap();
    assert_eq!(by_type, vec![monitor.clone()]);

    let by_user = services
        .reservations
        .filter_by_user_pid(100000000, None)
        .await
        .unwrap();
    assert_eq!(by_user, vec![camera.clone()]);

    let err = services
        .reservations
        .filter_by_type("monitor", Some(&USER))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));

    let err = services
        .reservations
        .filter_by_user_pid(123456789, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(services.reservations.list(None).await.unwrap(), vec![monitor, camera]);
}

#[sqlx::test]
#[ignore]
async fn reservation_type_is_not_resynced(pool: PgPool) {
    let services = seed(&pool).await;
    let reservation = services.reservations.add(&checkout_request(1, 2), None).await.unwrap();

    let mut renamed = inventory()[1].clone();
    renamed.equipment_type = "display".to_string();
    renamed.status = EquipmentStatus::Unavailable;
    services.equipment.update(&renamed, Some(&STAFF)).await.unwrap();

    let stored = services
        .reservations
        .get(reservation.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.reservation_type, "monitor");
    assert_eq!(stored.equipment.equipment_type, "display");
}

#[sqlx::test]
#[ignore]
async fn removing_equipment_drops_its_reservation(pool: PgPool) {
    let services = seed(&pool).await;
    let reservation = services.reservations.add(&checkout_request(1, 6), None).await.unwrap();

    services.equipment.remove(6, Some(&STAFF)).await.unwrap();
    assert!(services.reservations.get(reservation.id, None).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn update_waiting_on_checkout_sees_the_new_reservation(pool: PgPool) {
    let services = seed(&pool).await;

    // First half of a reservation create, left open while the update queues on the row lock
    let mut tx = pool.begin().await.unwrap();
    EquipmentRepository::checkout_in(&mut *tx, 1).await.unwrap();

    let racer = services.clone();
    let update = tokio::spawn(async move {
        let monitor = inventory()[0].clone();
        racer.equipment.update(&monitor, Some(&STAFF)).await
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    sqlx::query("INSERT INTO reservations (type, user_id, equipment_id) VALUES ('monitor', 1, 1)")
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let result = update.await.unwrap();
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(status_of(&services, 1).await, EquipmentStatus::Unavailable);
    assert_eq!(services.reservations.list(None).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore]
async fn checkout_and_checkin_flip_status(pool: PgPool) {
    let services = seed(&pool).await;

    let camera = services.equipment.checkout(4).await.unwrap();
    assert_eq!(camera.status, EquipmentStatus::Unavailable);
    assert_eq!(status_of(&services, 4).await, EquipmentStatus::Unavailable);

    let err = services.equipment.checkout(4).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let camera = services.equipment.checkin(4).await.unwrap();
    assert_eq!(camera.status, EquipmentStatus::Available);
    assert_eq!(status_of(&services, 4).await, EquipmentStatus::Available);

    assert!(matches!(
        services.equipment.checkout(99).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        services.equipment.checkin(99).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[sqlx::test]
#[ignore]
async fn direct_user_grant_covers_only_its_resource(pool: PgPool) {
    let services = seed(&pool).await;
    sqlx::query(
        "INSERT INTO permissions (action, resource, user_id) VALUES ('equipment.update', 'equipment/3', 6)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut keyboard = inventory()[2].clone();
    keyboard.name = "Razer".to_string();
    let updated = services.equipment.update(&keyboard, Some(&USER)).await.unwrap();
    assert_eq!(updated.map(|e| e.name), Some("Razer".to_string()));

    let mut monitor = inventory()[0].clone();
    monitor.name = "Acer".to_string();
    let err = services.equipment.update(&monitor, Some(&USER)).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));
    assert_eq!(services.equipment.get(1, None).await.unwrap(), Some(inventory()[0].clone()));
}

#[sqlx::test]
#[ignore]
async fn explicit_low_id_does_not_rewind_generated_ids(pool: PgPool) {
    let services = seed(&pool).await;
    let mut mouse = equipment(0, "Razer", "mouse", EquipmentStatus::Available, "");
    mouse.id = None;

    let first = services.equipment.add(&mouse, Some(&STAFF)).await.unwrap();
    assert_eq!(first.id, Some(7));
    services.equipment.remove(7, Some(&STAFF)).await.unwrap();

    services.equipment.remove(2, Some(&STAFF)).await.unwrap();
    services.equipment.add(&inventory()[1], Some(&STAFF)).await.unwrap();

    let second = services.equipment.add(&mouse, Some(&STAFF)).await.unwrap();
    assert_eq!(second.id, Some(8));
}
