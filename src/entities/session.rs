use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Rider,
    Driver,
}

impl UserType {
    pub fn name(&self) -> String {
        match self {
            Self::Rider => "rider".into(),
            Self::Driver => "driver".into(),
        }
    }
}

/// What the backend answers to a registration or a login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub user_type: UserType,
    pub token: String,
}

/// Identity of the signed-in user, persisted across restarts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_no: Option<String>,
}

impl Session {
    pub fn from_auth(auth: AuthResponse, profile: Profile) -> Self {
        Self {
            user_id: auth.user_id,
            user_type: auth.user_type,
            token: Some(auth.token),
            name: profile.name,
            phone: profile.phone,
            vehicle_no: profile.vehicle_no,
        }
    }

    pub fn is_rider(&self) -> bool {
        self.user_type == UserType::Rider
    }

    pub fn is_driver(&self) -> bool {
        self.user_type == UserType::Driver
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub vehicle_no: Option<String>,
}

#[test]
fn session_record_uses_camel_case_keys() {
    let session = Session {
        user_id: Uuid::nil(),
        user_type: UserType::Driver,
        token: Some("driver_x".into()),
        name: Some("Asha".into()),
        phone: Some("9000000001".into()),
        vehicle_no: Some("DL 1C 4455".into()),
    };

    let value = serde_json::to_value(&session).unwrap();

    assert_eq!(value["userType"], "driver");
    assert_eq!(value["vehicleNo"], "DL 1C 4455");
    assert!(value.get("user_id").is_none());
}

#[test]
fn session_role_follows_auth_response() {
    let auth = AuthResponse {
        user_id: Uuid::new_v4(),
        user_type: UserType::Driver,
        token: "driver_token".into(),
    };

    let session = Session::from_auth(auth, Profile::default());

    assert!(session.is_driver());
    assert!(!session.is_rider());
    assert_eq!(session.token.as_deref(), Some("driver_token"));
}
