use geoattend_core::db::open_db_in_memory;
use geoattend_core::{
    Actor, NewUser, SqliteUserRepository, UserRole, UserService, UserServiceError,
    UserValidationError,
};

fn new_user(username: &str, email: &str, role: UserRole) -> NewUser {
    NewUser {
        email: email.to_string(),
        username: username.to_string(),
        full_name: format!("{username} full name"),
        role,
        password_hash: "$argon2id$opaque".to_string(),
    }
}

#[test]
fn register_persists_normalized_user() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let user = service
        .register(&new_user(" grace ", " Grace@Example.COM ", UserRole::Lecturer))
        .unwrap();
    assert!(user.id > 0);
    assert_eq!(user.username, "grace");
    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.role, UserRole::Lecturer);
    assert!(user.created_at > 0);

    let me = service.current_user(&Actor::from(&user)).unwrap();
    assert_eq!(me, user);
}

#[test]
fn duplicate_username_is_rejected_before_email() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    service
        .register(&new_user("alan", "alan@example.com", UserRole::Student))
        .unwrap();

    let err = service
        .register(&new_user("alan", "alan@example.com", UserRole::Student))
        .unwrap_err();
    assert!(matches!(err, UserServiceError::UsernameTaken(name) if name == "alan"));
}

#[test]
fn duplicate_email_is_rejected_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    service
        .register(&new_user("alan", "alan@example.com", UserRole::Student))
        .unwrap();

    let err = service
        .register(&new_user("turing", "ALAN@example.com", UserRole::Student))
        .unwrap_err();
    assert!(matches!(err, UserServiceError::EmailTaken(email) if email == "alan@example.com"));
}

#[test]
fn invalid_registration_input_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let mut input = new_user("bob", "bob@example.com", UserRole::Student);
    input.password_hash.clear();
    let err = service.register(&input).unwrap_err();
    assert!(matches!(
        err,
        UserServiceError::Invalid(UserValidationError::EmptyCredential)
    ));
}

#[test]
fn current_user_for_unknown_actor_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));

    let err = service
        .current_user(&Actor::new(42, UserRole::Student))
        .unwrap_err();
    assert!(matches!(err, UserServiceError::UserNotFound(42)));
}

#[test]
fn password_hash_is_not_serialized() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(&conn));
    let user = service
        .register(&new_user("ada", "ada@example.com", UserRole::Admin))
        .unwrap();

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["role"], "admin");
    assert!(json.get("password_hash").is_none());
}
