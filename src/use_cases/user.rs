use tracing::error;

use crate::domain::entities::{NewUser, Role};
use crate::domain::errors::DomainError;
use crate::domain::ports::{NotificationOptionsStore, UserStore};
use crate::interface_adapters::protocol::{
    BasicResponse, DataResponse, NotificationOptions, User,
};

// Account management: signup, login, profile updates and deletion.
// Validation outcomes travel as `success: false` payloads; only lookups of
// resources the route itself names surface as domain errors.
pub struct UserService<U, N> {
    pub users: U,
    pub options: N,
}

impl<U, N> UserService<U, N>
where
    U: UserStore,
    N: NotificationOptionsStore,
{
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
        is_owner: bool,
    ) -> DataResponse<i32> {
        match self.users.find_by_email(email).await {
            Ok(Some(_)) => {
                return DataResponse::fail(format!("User with email {email} already exists"))
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "user lookup failed during signup");
                return DataResponse::fail("Error while creating user. Please try again later.");
            }
        }

        let hash = match bcrypt::hash(password, bcrypt::DEFAULT_COST) {
            Ok(hash) => hash,
            Err(err) => {
                error!(error = %err, "password hashing failed during signup");
                return DataResponse::fail("Error while creating user. Please try again later.");
            }
        };

        let role = if is_owner { Role::Owner } else { Role::Customer };
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: hash,
            role_id: role.id(),
        };

        let user = match self.users.insert(&new_user).await {
            Ok(user) => user,
            Err(err) => {
                error!(error = %err, "failed to insert user");
                return DataResponse::fail("Error while creating user. Please try again later.");
            }
        };

        if let Err(err) = self.options.insert_defaults(user.id).await {
            error!(error = %err, "failed to insert notification options");
            return DataResponse::fail(
                "Error while creating user notification options. Please try again later.",
            );
        }

        DataResponse::ok(
            format!("User with email {email} successfully created"),
            user.id,
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> DataResponse<i32> {
        let user = match self.users.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return DataResponse::fail(format!("User with email {email} does not exist."))
            }
            Err(err) => {
                error!(error = %err, "user lookup failed during login");
                return DataResponse::fail("Error while logging in. Please try again later.");
            }
        };

        if !bcrypt::verify(password, &user.password).unwrap_or(false) {
            return DataResponse::fail("Incorrect password.");
        }

        DataResponse::ok(
            format!("User with email {email} successfully logged in"),
            user.id,
        )
    }

    pub async fn get(&self, user_id: i32) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let options = self
            .options
            .find_by_user_id(user_id)
            .await
            .map_err(DomainError::Storage)?;

        Ok(User::from_entity(&user, options.as_ref()))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, DomainError> {
        let users = self
            .users
            .find_by_ids(ids)
            .await
            .map_err(DomainError::Storage)?;

        let mut views = Vec::with_capacity(users.len());
        for user in &users {
            let options = self
                .options
                .find_by_user_id(user.id)
                .await
                .map_err(DomainError::Storage)?;
            views.push(User::from_entity(user, options.as_ref()));
        }

        Ok(views)
    }

    pub async fn notification_options(
        &self,
        user_id: i32,
    ) -> Result<NotificationOptions, DomainError> {
        let options = self
            .options
            .find_by_user_id(user_id)
            .await
            .map_err(DomainError::Storage)?
            .ok_or(DomainError::UserNotFound(user_id))?;

        Ok(NotificationOptions::from(&options))
    }

    pub async fn update_email(&self, user_id: i32, new_email: &str) -> BasicResponse {
        let mut user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return BasicResponse::fail("User not found."),
            Err(err) => {
                error!(error = %err, "user lookup failed during email update");
                return BasicResponse::fail("Error while updating email. Please try again later.");
            }
        };

        match self.users.find_by_email(new_email).await {
            Ok(Some(existing)) if existing.id != user_id => {
                return BasicResponse::fail(format!(
                    "User with email {new_email} already exists."
                ))
            }
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, "email lookup failed during email update");
                return BasicResponse::fail("Error while updating email. Please try again later.");
            }
        }

        user.email = new_email.to_string();
        if let Err(err) = self.users.save(&user).await {
            error!(error = %err, "failed to save user email");
            return BasicResponse::fail("Error while updating email. Please try again later.");
        }

        BasicResponse::ok(format!("Email successfully updated to {new_email}."))
    }

    pub async fn update_username(&self, user_id: i32, new_username: &str) -> BasicResponse {
        let mut user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return BasicResponse::fail("User not found."),
            Err(err) => {
                error!(error = %err, "user lookup failed during username update");
                return BasicResponse::fail(
                    "Error while updating username. Please try again later.",
                );
            }
        };

        user.username = new_username.to_string();
        if let Err(err) = self.users.save(&user).await {
            error!(error = %err, "failed to save username");
            return BasicResponse::fail("Error while updating username. Please try again later.");
        }

        BasicResponse::ok(format!("Username successfully updated to {new_username}."))
    }

    pub async fn update_password(&self, user_id: i32, new_password: &str) -> BasicResponse {
        if new_password.is_empty() {
            return BasicResponse::fail("Password cannot be empty.");
        }

        let mut user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return BasicResponse::fail("User not found."),
            Err(err) => {
                error!(error = %err, "user lookup failed during password update");
                return BasicResponse::fail(
                    "Error while updating password. Please try again later.",
                );
            }
        };

        user.password = match bcrypt::hash(new_password, bcrypt::DEFAULT_COST) {
            Ok(hash) => hash,
            Err(err) => {
                error!(error = %err, "password hashing failed during password update");
                return BasicResponse::fail(
                    "Error while updating password. Please try again later.",
                );
            }
        };

        if let Err(err) = self.users.save(&user).await {
            error!(error = %err, "failed to save password");
            return BasicResponse::fail("Error while updating password. Please try again later.");
        }

        BasicResponse::ok("Password successfully updated.")
    }

    pub async fn update_location(
        &self,
        user_id: i32,
        latitude: f64,
        longitude: f64,
    ) -> BasicResponse {
        let mut user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return BasicResponse::fail("User not found."),
            Err(err) => {
                error!(error = %err, "user lookup failed during location update");
                return BasicResponse::fail(
                    "Error while updating location. Please try again later.",
                );
            }
        };

        user.last_known_latitude = Some(latitude);
        user.last_known_longitude = Some(longitude);

        if let Err(err) = self.users.save(&user).await {
            error!(error = %err, "failed to save location");
            return BasicResponse::fail("Error while updating location. Please try again later.");
        }

        BasicResponse::ok("Location successfully updated.")
    }

    pub async fn update_notification_options(
        &self,
        user_id: i32,
        push_enabled: bool,
        email_enabled: bool,
        location_enabled: bool,
    ) -> BasicResponse {
        let mut options = match self.options.find_by_user_id(user_id).await {
            Ok(Some(options)) => options,
            Ok(None) => return BasicResponse::fail("User not found."),
            Err(err) => {
                error!(error = %err, "options lookup failed during notification update");
                return BasicResponse::fail(
                    "Error while updating notification options. Please try again later.",
                );
            }
        };

        options.push_notifications_enabled = push_enabled;
        options.email_notifications_enabled = email_enabled;
        options.location_services_enabled = location_enabled;

        if let Err(err) = self.options.save(&options).await {
            error!(error = %err, "failed to save notification options");
            return BasicResponse::fail(
                "Error while updating notification options. Please try again later.",
            );
        }

        BasicResponse::ok("Notification options successfully updated.")
    }

    pub async fn delete(&self, user_id: i32) -> BasicResponse {
        match self.users.find_by_id(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return BasicResponse::fail("User not found."),
            Err(err) => {
                error!(error = %err, "user lookup failed during delete");
                return BasicResponse::fail("Error while deleting user. Please try again later.");
            }
        }

        if let Err(err) = self.users.delete(user_id).await {
            error!(error = %err, "failed to delete user");
            return BasicResponse::fail("Error while deleting user. Please try again later.");
        }

        BasicResponse::ok("User successfully deleted.")
    }
}
