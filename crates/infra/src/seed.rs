//! Default modules, roles and developer permissions.

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use warden_core::{
    Module, ModuleInput, NewUser, Permission, PermissionInput, Role, RoleInput, User,
};
use warden_query::Predicate;

use crate::stores::Stores;

pub const DEFAULT_MODULES: [&str; 5] = ["appinfo", "user", "module", "permission", "role"];
pub const DEFAULT_ROLE: &str = "default";
pub const DEVELOPER_ROLE: &str = "developer";

/// What the seed run ended up with.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub developer: Role,
    pub modules: Vec<Module>,
    pub admin: Option<User>,
}

/// Ensure the default graph exists. Existing rows (matched by name) are reused,
/// so running this twice changes nothing.
///
/// With `admin_email` set, a user with that email is ensured and given the
/// developer role.
pub async fn seed_defaults(
    stores: &Stores,
    admin_email: Option<&str>,
) -> anyhow::Result<SeedReport> {
    let mut modules = Vec::with_capacity(DEFAULT_MODULES.len());
    for name in DEFAULT_MODULES {
        modules.push(ensure_module(stores, name).await?);
    }

    ensure_role(stores, DEFAULT_ROLE).await?;
    let developer = ensure_role(stores, DEVELOPER_ROLE).await?;

    for module in &modules {
        let predicate = Predicate::all()
            .and_eq("roleId", developer.id.to_string())
            .and_eq("moduleId", module.id.to_string());
        if stores.permissions.find_one(&predicate).await?.is_some() {
            continue;
        }
        let permission = Permission::create(
            PermissionInput {
                view: true,
                add: true,
                edit: true,
                delete: true,
                mask: false,
                role_id: developer.id,
                module_id: module.id,
                status: 1,
            },
            Utc::now(),
        )?;
        stores
            .permissions
            .insert(permission)
            .await
            .with_context(|| format!("granting developer rights on '{}'", module.name))?;
    }

    let admin = match admin_email {
        Some(email) => Some(ensure_admin(stores, email, &developer).await?),
        None => None,
    };

    info!(modules = modules.len(), developer_role = %developer.id, "default rbac data seeded");
    Ok(SeedReport {
        developer,
        modules,
        admin,
    })
}

async fn ensure_module(stores: &Stores, name: &str) -> anyhow::Result<Module> {
    let existing = stores
        .modules
        .find_one(&Predicate::all().and_eq("name", name))
        .await?;
    if let Some(module) = existing {
        return Ok(module);
    }
    let module = Module::create(ModuleInput { name: name.to_string() }, Utc::now())?;
    stores
        .modules
        .insert(module)
        .await
        .with_context(|| format!("creating module '{name}'"))
}

async fn ensure_role(stores: &Stores, name: &str) -> anyhow::Result<Role> {
    let existing = stores
        .roles
        .find_one(&Predicate::all().and_eq("name", name))
        .await?;
    if let Some(role) = existing {
        return Ok(role);
    }
    let role = Role::create(
        RoleInput {
            name: name.to_string(),
            score: 0,
        },
        Utc::now(),
    )?;
    stores
        .roles
        .insert(role)
        .await
        .with_context(|| format!("creating role '{name}'"))
}

async fn ensure_admin(stores: &Stores, email: &str, developer: &Role) -> anyhow::Result<User> {
    let email = warden_core::model::user::normalize_email(email)?;
    let existing = stores
        .users
        .find_one(&Predicate::all().and_eq("email", email.as_str()))
        .await?;
    let user = match existing {
        Some(user) => user,
        None => {
            let user = User::create(
                NewUser {
                    name: "admin".to_string(),
                    email: email.clone(),
                    role_id: Some(developer.id),
                },
                Utc::now(),
            )?;
            stores.users.insert(user).await.context("creating admin user")?
        }
    };
    info!(user_id = %user.id, email = %user.email, "admin user ready");
    Ok(user)
}
