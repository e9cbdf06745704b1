//! Sign-in and sign-out.

use shopfront_cart::{KeyValueStore, SessionEvent, SessionSync};
use shopfront_core::UserId;

use super::{AUTH_TOKEN_KEY, CommandError, Context};

/// Record `user_id` as the signed-in user.
#[allow(clippy::print_stdout)]
pub fn login(ctx: &Context, user_id: &str) -> Result<(), CommandError> {
    let user: UserId = user_id
        .trim()
        .parse()
        .map_err(|_| CommandError::InvalidUserId(user_id.to_string()))?;

    let mut store = ctx.open_store();
    let mut session = SessionSync::new();
    session.handle(&mut store, SessionEvent::SignedIn(user));
    ctx.storage().set(AUTH_TOKEN_KEY, &user.to_string())?;

    println!("Signed in as {user}.");
    Ok(())
}

/// Sign out: clears the cart and removes stored auth tokens.
#[allow(clippy::print_stdout)]
pub fn logout(ctx: &Context) {
    let mut store = ctx.open_store();
    let mut session = SessionSync::new();
    session.handle(&mut store, SessionEvent::SignedOut);
    println!("Signed out.");
}
