//! Column declarations for every stored entity.
//!
//! Only columns listed here can be filtered or sorted on, and only their SQL
//! names are ever interpolated into queries.

use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use warden_core::{
    AppInfo, AppInfoId, Module, ModuleId, Permission, PermissionId, Role, RoleId, User, UserId,
};
use warden_query::{FieldKind, FieldValue};

use crate::store::{Column, Table};

const ID: Column = Column::new("id", "id", FieldKind::Uuid);
const CREATED_AT: Column = Column::new("createdAt", "created_at", FieldKind::Timestamp);
const UPDATED_AT: Column = Column::new("updatedAt", "updated_at", FieldKind::Timestamp);

impl Table for User {
    const NAME: &'static str = "users";
    const ENTITY: &'static str = "user";
    const COLUMNS: &'static [Column] = &[
        ID,
        Column::new("name", "name", FieldKind::Text),
        Column::new("email", "email", FieldKind::Text),
        Column::new("roleId", "role_id", FieldKind::Uuid),
        Column::new("isEmailVerified", "is_email_verified", FieldKind::Boolean),
        CREATED_AT,
        UPDATED_AT,
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["email"]];

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "id" => self.id().into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "roleId" => self.role_id.map(Uuid::from).into(),
            "isEmailVerified" => self.is_email_verified.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: UserId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role_id: row.try_get::<Option<Uuid>, _>("role_id")?.map(RoleId::from_uuid),
            is_email_verified: row.try_get("is_email_verified")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Table for Role {
    const NAME: &'static str = "roles";
    const ENTITY: &'static str = "role";
    const COLUMNS: &'static [Column] = &[
        ID,
        Column::new("name", "name", FieldKind::Text),
        Column::new("score", "score", FieldKind::Integer),
        CREATED_AT,
        UPDATED_AT,
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "id" => self.id().into(),
            "name" => self.name.as_str().into(),
            "score" => self.score.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Role {
            id: RoleId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            score: row.try_get("score")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Table for Module {
    const NAME: &'static str = "modules";
    const ENTITY: &'static str = "module";
    const COLUMNS: &'static [Column] = &[
        ID,
        Column::new("name", "name", FieldKind::Text),
        CREATED_AT,
        UPDATED_AT,
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["name"]];

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "id" => self.id().into(),
            "name" => self.name.as_str().into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Module {
            id: ModuleId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Table for Permission {
    const NAME: &'static str = "permissions";
    const ENTITY: &'static str = "permission";
    const COLUMNS: &'static [Column] = &[
        ID,
        Column::new("view", "view", FieldKind::Boolean),
        Column::new("add", "add", FieldKind::Boolean),
        Column::new("edit", "edit", FieldKind::Boolean),
        Column::new("delete", "delete", FieldKind::Boolean),
        Column::new("mask", "mask", FieldKind::Boolean),
        Column::new("roleId", "role_id", FieldKind::Uuid),
        Column::new("moduleId", "module_id", FieldKind::Uuid),
        Column::new("status", "status", FieldKind::Integer),
        CREATED_AT,
        UPDATED_AT,
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[&["roleId", "moduleId"]];

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "id" => self.id().into(),
            "view" => self.view.into(),
            "add" => self.add.into(),
            "edit" => self.edit.into(),
            "delete" => self.delete.into(),
            "mask" => self.mask.into(),
            "roleId" => Uuid::from(self.role_id).into(),
            "moduleId" => Uuid::from(self.module_id).into(),
            "status" => self.status.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Permission {
            id: PermissionId::from_uuid(row.try_get("id")?),
            view: row.try_get("view")?,
            add: row.try_get("add")?,
            edit: row.try_get("edit")?,
            delete: row.try_get("delete")?,
            mask: row.try_get("mask")?,
            role_id: RoleId::from_uuid(row.try_get("role_id")?),
            module_id: ModuleId::from_uuid(row.try_get("module_id")?),
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Table for AppInfo {
    const NAME: &'static str = "app_info";
    const ENTITY: &'static str = "appInfo";
    const COLUMNS: &'static [Column] = &[
        ID,
        Column::new("os", "os", FieldKind::Text),
        Column::new("version", "version", FieldKind::Text),
        Column::new("update_type", "update_type", FieldKind::Integer),
        CREATED_AT,
        UPDATED_AT,
    ];
    const UNIQUE: &'static [&'static [&'static str]] = &[];

    fn id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn value(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "id" => self.id().into(),
            "os" => self.os.clone().into(),
            "version" => self.version.as_str().into(),
            "update_type" => self.update_type.into(),
            "createdAt" => self.created_at.into(),
            "updatedAt" => self.updated_at.into(),
            _ => return None,
        })
    }

    fn from_pg_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(AppInfo {
            id: AppInfoId::from_uuid(row.try_get("id")?),
            os: row.try_get("os")?,
            version: row.try_get("version")?,
            update_type: row.try_get("update_type")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared_fields_resolve<T: Table>(sample: &T) {
        for column in T::COLUMNS {
            assert!(
                sample.value(column.field).is_some(),
                "{}.{} has no value accessor",
                T::NAME,
                column.field
            );
        }
        assert_eq!(T::COLUMNS[0].sql, "id");
        for group in T::UNIQUE {
            for field in *group {
                assert!(T::column(field).is_some(), "unique field {field} not declared");
            }
        }
    }

    #[test]
    fn every_column_has_an_accessor() {
        let now = chrono::Utc::now();
        let role = Role::create(
            warden_core::RoleInput {
                name: "developer".into(),
                score: 1,
            },
            now,
        )
        .unwrap();
        declared_fields_resolve(&role);

        let module = Module::create(warden_core::ModuleInput { name: "user".into() }, now).unwrap();
        declared_fields_resolve(&module);

        let permission = Permission::create(
            warden_core::PermissionInput {
                view: true,
                add: true,
                edit: true,
                delete: true,
                mask: false,
                role_id: role.id,
                module_id: module.id,
                status: 1,
            },
            now,
        )
        .unwrap();
        declared_fields_resolve(&permission);

        let app_info = AppInfo::create(
            warden_core::AppInfoInput {
                os: None,
                version: "1.0.0".into(),
                update_type: 0,
            },
            now,
        )
        .unwrap();
        declared_fields_resolve(&app_info);
        assert_eq!(app_info.value("os"), Some(FieldValue::Null));

        let user = User::create(
            warden_core::NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role_id: Some(role.id),
            },
            now,
        )
        .unwrap();
        declared_fields_resolve(&user);
    }
}
