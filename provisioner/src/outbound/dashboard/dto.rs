//! DTOs for the dashboard's JSON wire format.
//!
//! Responses decode into these transport DTOs first and are then mapped into
//! domain records in one pass. Request DTOs borrow from the domain request so
//! secrets are not copied.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{Column, CreatedUser, DataConnection, NewRestriction, NewUser, Table};
use crate::domain::{NewVariable, UserId, UserRecord, Variable};

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    #[serde(default)]
    pub(super) token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    id: i64,
    #[serde(default)]
    usercode: String,
    #[serde(default)]
    parent_id: Option<i64>,
}

impl From<UserDto> for UserRecord {
    fn from(dto: UserDto) -> Self {
        Self::new(dto.id, dto.usercode, dto.parent_id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VariableDto {
    name: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    is_secure: bool,
}

impl From<VariableDto> for Variable {
    fn from(dto: VariableDto) -> Self {
        Self::new(dto.name, dto.value.unwrap_or_default(), dto.is_secure)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedUserDto {
    id: i64,
    #[serde(default)]
    usercode: String,
}

impl From<CreatedUserDto> for CreatedUser {
    fn from(dto: CreatedUserDto) -> Self {
        Self {
            id: UserId::new(dto.id),
            usercode: dto.usercode,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DataConnectionDto {
    id: i64,
    #[serde(default)]
    name: String,
}

impl From<DataConnectionDto> for DataConnection {
    fn from(dto: DataConnectionDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TableDto {
    id: i64,
    #[serde(default)]
    name: String,
}

impl From<TableDto> for Table {
    fn from(dto: TableDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ColumnDto {
    id: i64,
    #[serde(default)]
    display_name: String,
}

impl From<ColumnDto> for Column {
    fn from(dto: ColumnDto) -> Self {
        Self {
            id: dto.id,
            display_name: dto.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VariableRequestDto<'a> {
    user_id: i64,
    name: &'a str,
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_secure: Option<bool>,
}

impl<'a> From<&'a NewVariable> for VariableRequestDto<'a> {
    fn from(variable: &'a NewVariable) -> Self {
        Self {
            user_id: variable.user_id.get(),
            name: variable.name.as_str(),
            value: variable.value.as_str(),
            is_secure: variable.is_secure,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RestrictionRequestDto<'a> {
    user_id: i64,
    column_id: i64,
    value: &'a str,
}

impl<'a> From<&'a NewRestriction> for RestrictionRequestDto<'a> {
    fn from(restriction: &'a NewRestriction) -> Self {
        Self {
            user_id: restriction.user_id.get(),
            column_id: restriction.column_id,
            value: restriction.value.as_str(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserRequestDto<'a> {
    email: &'a str,
    parent_id: i64,
    surname: &'a str,
    forenames: &'a str,
    user_type_id: u8,
    usercode: &'a str,
    client_password: &'a str,
    lite: bool,
}

impl<'a> From<&'a NewUser> for UserRequestDto<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            email: user.email.as_str(),
            parent_id: user.parent_id.get(),
            surname: user.surname.as_str(),
            forenames: user.forenames.as_str(),
            user_type_id: user.user_type_id,
            usercode: user.usercode.as_str(),
            client_password: user.client_password.as_str(),
            lite: user.lite,
        }
    }
}
