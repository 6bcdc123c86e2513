#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

mod common;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::timeout;

use common::{AVATAR_URL, FakeAuthUseCase, profile, session, user};
use domain::auth_state::AuthState;
use domain::events::{AuthChangeEvent, AuthStateChange};
use domain::profile::{AvatarFile, ProfileUpdate};
use petfinder_adapters::incoming::auth_store::store::AuthStore;
use petfinder_adapters::outgoing::tokio_spawn::TokioTaskSpawnAdapter;
use petfinder_application::{
    error::{AppError, AppResult},
    ports::incoming::auth::AuthUseCase,
};

const WAIT: Duration = Duration::from_secs(2);

type ActionFuture = Pin<Box<dyn Future<Output = AppResult<()>> + Send>>;
type Action = fn(Arc<AuthStore>) -> ActionFuture;

fn every_action() -> [(&'static str, Action); 9] {
    [
        ("initialize", |store| -> ActionFuture {
            Box::pin(async move { store.initialize().await })
        }),
        ("sign_in", |store| -> ActionFuture {
            Box::pin(async move { store.sign_in("a@b.com", "pw").await.map(drop) })
        }),
        ("sign_up", |store| -> ActionFuture {
            Box::pin(async move { store.sign_up("a@b.com", "pw", "A", "X").await.map(drop) })
        }),
        ("sign_in_with_google", |store| -> ActionFuture {
            Box::pin(async move { store.sign_in_with_google().await.map(drop) })
        }),
        ("complete_google_sign_in", |store| -> ActionFuture {
            Box::pin(async move { store.complete_google_sign_in("code").await.map(drop) })
        }),
        ("sign_out", |store| -> ActionFuture {
            Box::pin(async move { store.sign_out().await })
        }),
        ("reset_password", |store| -> ActionFuture {
            Box::pin(async move { store.reset_password("a@b.com").await })
        }),
        ("update_profile", |store| -> ActionFuture {
            Box::pin(async move {
                store
                    .update_profile(ProfileUpdate::default().name("B"))
                    .await
                    .map(drop)
            })
        }),
        ("upload_avatar", |store| -> ActionFuture {
            Box::pin(async move {
                store
                    .upload_avatar(AvatarFile::new("me.jpg", None, vec![1]))
                    .await
                    .map(drop)
            })
        }),
    ]
}

fn assert_signed_out(state: &AuthState) {
    assert!(state.user.is_none());
    assert!(state.profile.is_none());
    assert!(state.session.is_none());
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

fn store_over(fake: &Arc<FakeAuthUseCase>) -> Arc<AuthStore> {
    let use_case: Arc<dyn AuthUseCase> = Arc::clone(fake) as Arc<dyn AuthUseCase>;
    Arc::new(AuthStore::new(use_case))
}

#[tokio::test]
async fn new_store_starts_empty_and_idle() {
    let store = store_over(&FakeAuthUseCase::new());
    assert_signed_out(&store.snapshot());
    assert!(!store.snapshot().loading);
}

#[tokio::test]
async fn loading_is_visible_while_an_action_is_in_flight() {
    let fake = FakeAuthUseCase::new();
    let gate = fake.hold();
    let store = store_over(&fake);
    let mut states = store.subscribe();

    let pending = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.sign_in("a@b.com", "pw").await }
    });

    timeout(WAIT, states.wait_for(|state| state.loading))
        .await
        .unwrap()
        .unwrap();
    assert!(store.snapshot().error.is_none());

    gate.notify_one();
    pending.await.unwrap().unwrap();
    assert!(!store.snapshot().loading);
}

#[tokio::test]
async fn every_action_shows_loading_until_it_settles() {
    for (name, action) in every_action() {
        for fail in [false, true] {
            let fake = FakeAuthUseCase::with_session_and_profile();
            let store = store_over(&fake);
            store.initialize().await.unwrap();
            if fail {
                fake.fail_with("boom");
            }

            let gate = fake.hold();
            let mut states = store.subscribe();
            let pending = tokio::spawn(action(Arc::clone(&store)));

            timeout(WAIT, states.wait_for(|state| state.loading))
                .await
                .expect(name)
                .unwrap();

            gate.notify_one();
            let result = pending.await.unwrap();
            let state = store.snapshot();
            assert!(!state.loading, "{name} left loading set (fail={fail})");
            assert_eq!(result.is_err(), fail, "{name} result (fail={fail})");
            if fail {
                assert_eq!(state.error.as_deref(), Some("boom"), "{name} error");
            } else {
                assert_eq!(state.error, None, "{name} error");
            }
        }
    }
}

#[tokio::test]
async fn sign_in_success_sets_user() {
    let fake = FakeAuthUseCase::new();
    let store = store_over(&fake);

    let user = store.sign_in("a@b.com", "pw").await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.user, Some(user));
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(fake.calls(), vec!["sign_in a@b.com pw"]);
}

#[tokio::test]
async fn sign_in_failure_records_message_and_reraises() {
    let fake = FakeAuthUseCase::new();
    fake.fail_with("Invalid login credentials");
    let store = store_over(&fake);

    let result = store.sign_in("a@b.com", "wrong").await;

    assert!(matches!(result, Err(AppError::RemoteService { .. })));
    let state = store.snapshot();
    assert_eq!(state.user, None);
    assert_eq!(state.error.as_deref(), Some("Invalid login credentials"));
    assert!(!state.loading);
}

#[tokio::test]
async fn next_action_clears_previous_error() {
    let fake = FakeAuthUseCase::new();
    let store = store_over(&fake);
    store.set_error(Some("stale".to_string()));

    store.reset_password("a@b.com").await.unwrap();

    assert_eq!(store.snapshot().error, None);
    assert_eq!(fake.calls(), vec!["reset_password a@b.com"]);
}

#[tokio::test]
async fn set_and_clear_error() {
    let store = store_over(&FakeAuthUseCase::new());
    store.set_error(Some("boom".to_string()));
    assert_eq!(store.snapshot().error.as_deref(), Some("boom"));
    store.clear_error();
    assert_eq!(store.snapshot().error, None);
}

#[tokio::test]
async fn update_profile_without_user_never_reaches_the_backend() {
    let fake = FakeAuthUseCase::new();
    let store = store_over(&fake);

    let result = store
        .update_profile(ProfileUpdate::default().name("B"))
        .await;

    assert!(matches!(result, Err(AppError::NoUserLoggedIn)));
    assert!(fake.calls().is_empty());
    let state = store.snapshot();
    assert_eq!(state.error.as_deref(), Some("No user logged in"));
    assert!(!state.loading);
}

#[tokio::test]
async fn upload_avatar_without_user_fails() {
    let fake = FakeAuthUseCase::new();
    let store = store_over(&fake);

    let result = store
        .upload_avatar(AvatarFile::new("me.jpg", None, vec![1, 2, 3]))
        .await;

    assert!(matches!(result, Err(AppError::NoUserLoggedIn)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn initialize_loads_session_user_and_profile() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);

    store.initialize().await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.user, Some(user()));
    assert_eq!(state.profile, Some(profile()));
    assert_eq!(state.session.map(|s| s.user), Some(user()));
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert_eq!(fake.calls(), vec!["get_session", "get_profile u1"]);
}

#[tokio::test]
async fn initialize_without_session_leaves_state_empty() {
    let fake = FakeAuthUseCase::new();
    let store = store_over(&fake);

    store.initialize().await.unwrap();

    assert_signed_out(&store.snapshot());
    assert_eq!(fake.calls(), vec!["get_session"]);
}

#[tokio::test]
async fn initialize_tolerates_profile_failure() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    fake.fail_profile_with("permission denied");
    let store = store_over(&fake);

    store.initialize().await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.user, Some(user()));
    assert_eq!(state.profile, None);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn upload_avatar_only_changes_avatar_url() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();

    let url = store
        .upload_avatar(AvatarFile::new("me.jpg", Some("image/jpeg".to_string()), vec![1]))
        .await
        .unwrap();

    assert_eq!(url, AVATAR_URL);
    let expected = profile().with_avatar_url(AVATAR_URL.to_string());
    assert_eq!(store.snapshot().profile, Some(expected));
}

#[tokio::test]
async fn update_profile_replaces_profile() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();

    let updated = store
        .update_profile(ProfileUpdate::default().city("Y"))
        .await
        .unwrap();

    assert_eq!(updated.city, "Y");
    assert_eq!(store.snapshot().profile, Some(updated));
}

#[tokio::test]
async fn sign_out_clears_everything_in_one_transition() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();

    let mut states = store.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            let done = !state.loading && state.user.is_none();
            seen.push(state);
            if done {
                break;
            }
        }
        seen
    });

    store.sign_out().await.unwrap();

    let seen = timeout(WAIT, observer).await.unwrap().unwrap();
    for state in &seen {
        let cleared = [
            state.user.is_none(),
            state.profile.is_none(),
            state.session.is_none(),
        ];
        assert!(
            cleared.iter().all(|c| *c) || cleared.iter().all(|c| !*c),
            "observed a partially cleared state: {state:?}"
        );
    }
    assert_signed_out(&store.snapshot());
}

#[tokio::test]
async fn complete_google_sign_in_stores_session_and_user() {
    let fake = FakeAuthUseCase::new();
    let store = store_over(&fake);

    let url = store.sign_in_with_google().await.unwrap();
    assert_eq!(url.query(), Some("provider=google"));
    assert_eq!(store.snapshot().user, None);

    store.complete_google_sign_in("code-1").await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.user, Some(user()));
    assert!(state.session.is_some());
}

#[tokio::test]
async fn backend_sign_out_event_force_clears_state() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();
    let _subscription = store.listen(Arc::new(TokioTaskSpawnAdapter::new(Handle::current())));

    fake.listeners
        .emit(&AuthStateChange::new(AuthChangeEvent::SignedOut, None));

    assert_signed_out(&store.snapshot());
}

#[tokio::test]
async fn backend_sign_out_during_sign_out_keeps_loading_until_settled() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();
    let _subscription = store.listen(Arc::new(TokioTaskSpawnAdapter::new(Handle::current())));
    let mut states = store.subscribe();

    let gate = fake.hold();
    let pending = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.sign_out().await }
    });
    timeout(WAIT, states.wait_for(|state| state.loading))
        .await
        .unwrap()
        .unwrap();

    fake.listeners
        .emit(&AuthStateChange::new(AuthChangeEvent::SignedOut, None));
    let state = store.snapshot();
    assert!(state.user.is_none());
    assert!(state.loading);

    gate.notify_one();
    pending.await.unwrap().unwrap();
    assert_signed_out(&store.snapshot());
}

#[tokio::test]
async fn backend_sign_in_event_reinitializes() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    let _subscription = store.listen(Arc::new(TokioTaskSpawnAdapter::new(Handle::current())));
    let mut states = store.subscribe();

    fake.listeners.emit(&AuthStateChange::new(
        AuthChangeEvent::SignedIn,
        Some(session()),
    ));

    timeout(WAIT, states.wait_for(|state| state.profile.is_some()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(store.snapshot().user, Some(user()));
}

#[tokio::test]
async fn other_events_are_ignored() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();
    let _subscription = store.listen(Arc::new(TokioTaskSpawnAdapter::new(Handle::current())));

    fake.listeners.emit(&AuthStateChange::new(
        AuthChangeEvent::from_tag("MFA_CHALLENGE_VERIFIED"),
        None,
    ));

    let state = store.snapshot();
    assert_eq!(state.user, Some(user()));
    assert_eq!(state.profile, Some(profile()));
}

#[tokio::test]
async fn dropping_the_subscription_stops_delivery() {
    let fake = FakeAuthUseCase::with_session_and_profile();
    let store = store_over(&fake);
    store.initialize().await.unwrap();
    let subscription = store.listen(Arc::new(TokioTaskSpawnAdapter::new(Handle::current())));
    assert_eq!(fake.listeners.listener_count(), 1);

    drop(subscription);
    fake.listeners
        .emit(&AuthStateChange::new(AuthChangeEvent::SignedOut, None));

    assert_eq!(fake.listeners.listener_count(), 0);
    assert_eq!(store.snapshot().user, Some(user()));
}
