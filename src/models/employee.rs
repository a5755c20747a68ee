use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{lenient, Record};
use crate::store::Fields;

/// Unknown or missing roles decode as `User`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Employee {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub fname: String,
    #[serde(deserialize_with = "lenient")]
    pub lname: String,
    #[serde(deserialize_with = "lenient")]
    pub email: String,
    #[serde(deserialize_with = "lenient")]
    pub username: String,
    #[serde(deserialize_with = "lenient")]
    pub role: Role,
}

impl Record for Employee {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeUpdate {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.fname.is_none()
            && self.lname.is_none()
            && self.email.is_none()
            && self.username.is_none()
            && self.role.is_none()
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        let text = [
            ("fname", &self.fname),
            ("lname", &self.lname),
            ("email", &self.email),
            ("username", &self.username),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                fields.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        if let Some(role) = self.role {
            fields.insert("role".to_string(), Value::String(role.as_str().to_string()));
        }
        fields
    }

    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(fname) = &self.fname {
            employee.fname.clone_from(fname);
        }
        if let Some(lname) = &self.lname {
            employee.lname.clone_from(lname);
        }
        if let Some(email) = &self.email {
            employee.email.clone_from(email);
        }
        if let Some(username) = &self.username {
            employee.username.clone_from(username);
        }
        if let Some(role) = self.role {
            employee.role = role;
        }
    }
}
