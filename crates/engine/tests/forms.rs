mod common;

use common::{trip, user};
use divvy_engine::{
    ApiError, CreateExpenseForm, CreateGroupForm, CreateUserForm, FormError, FormStatus, Money,
    Route, SplitMode, ValidationError,
};

#[tokio::test]
async fn create_user_goes_back_to_dashboard() {
    let api = trip();
    let mut form = CreateUserForm::default();
    form.name = "  Dora ".to_string();

    let route = form.submit(&api).await.unwrap();
    assert_eq!(route, Some(Route::Dashboard));
    assert_eq!(form.status(), FormStatus::Succeeded);
    assert_eq!(api.calls(), vec!["create_user Dora"]);
}

#[tokio::test]
async fn invalid_user_form_makes_no_request() {
    let api = trip();
    let mut form = CreateUserForm::default();

    let err = form.submit(&api).await.unwrap_err();
    assert_eq!(err, FormError::Invalid(ValidationError::MissingUserName));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn server_error_is_shown_and_form_can_retry() {
    let api = trip().failing(
        "create_user",
        ApiError::Rejected {
            status: 400,
            message: Some("Name already taken".to_string()),
        },
    );
    let mut form = CreateUserForm::default();
    form.name = "Ada".to_string();

    assert_eq!(form.submit(&api).await, Ok(None));
    assert_eq!(form.error(), Some("Name already taken"));
    assert_eq!(form.status(), FormStatus::Idle);
    assert!(form.begin_submit().is_ok());
}

#[tokio::test]
async fn double_submit_sends_one_request() {
    let api = trip();
    let mut form = CreateUserForm::default();
    form.name = "Ada".to_string();

    let (ticket, payload) = form.begin_submit().unwrap();
    assert_eq!(form.begin_submit(), Err(FormError::AlreadySubmitting));

    let result = divvy_engine::SplitApi::create_user(&api, &payload).await;
    assert_eq!(form.finish(&ticket, result), Some(Route::Dashboard));
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn group_created_after_leaving_form_does_not_navigate() {
    let api = trip();
    let mut form = CreateGroupForm::default();
    form.load_users(&api).await;
    form.name = "Flat".to_string();
    form.select("A");

    let (ticket, payload) = form.begin_submit().unwrap();
    form.close();
    let result = divvy_engine::SplitApi::create_group(&api, &payload).await;

    assert_eq!(form.finish(&ticket, result), None);
    assert_eq!(form.status(), FormStatus::Idle);
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn create_group_with_picked_members() {
    let api = trip();
    let mut form = CreateGroupForm::default();
    form.load_users(&api).await;
    assert_eq!(form.users().ready().map(Vec::len), Some(3));

    form.name = "Flat".to_string();
    form.select("A");
    form.select("B");
    form.select("A");
    form.remove("B");
    form.select("B");

    assert_eq!(form.selected(), [user("A", "Ada"), user("B", "Bea")]);
    assert_eq!(form.submit(&api).await, Ok(Some(Route::Dashboard)));
    assert_eq!(api.calls(), vec!["list_users", "create_group Flat"]);
}

#[tokio::test]
async fn user_list_failure_is_reported() {
    let api = trip().failing("list_users", ApiError::Transport("refused".to_string()));
    let mut form = CreateGroupForm::default();
    form.load_users(&api).await;

    assert_eq!(form.users().error(), Some("Failed to fetch users"));
    form.name = "Flat".to_string();
    assert_eq!(
        form.begin_submit(),
        Err(FormError::Invalid(ValidationError::NoGroupMembers))
    );
}

#[tokio::test]
async fn equal_split_expense_is_submitted() {
    let api = trip();
    let mut form = CreateExpenseForm::new("g1");
    form.load(&api).await;

    form.set_payer("B");
    form.amount = "45,50".to_string();
    form.split_mut().unwrap().toggle("C0ffee1234");

    let route = form.submit(&api).await.unwrap();
    assert_eq!(route, Some(Route::Group("g1".to_string())));

    let created = api.created_expenses();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].payer_id, "B");
    assert_eq!(created[0].amount, 45.5);
    assert_eq!(created[0].split_among, vec!["A", "B"]);
}

#[tokio::test]
async fn custom_split_must_add_up() {
    let api = trip();
    let mut form = CreateExpenseForm::new("g1").with_tolerance(Money::new(1));
    form.load(&api).await;
    form.set_payer("A");
    form.amount = "100".to_string();

    let split = form.split_mut().unwrap();
    split.set_mode(SplitMode::Custom);
    split.set_custom_amount("A", "33");
    split.set_custom_amount("B", "33");
    split.set_custom_amount("C0ffee1234", "33");

    let err = form.submit(&api).await.unwrap_err();
    assert!(matches!(
        err,
        FormError::Invalid(ValidationError::CustomSumMismatch { .. })
    ));

    form.split_mut().unwrap().set_custom_amount("C0ffee1234", "34");
    assert_eq!(
        form.submit(&api).await,
        Ok(Some(Route::Group("g1".to_string())))
    );
    assert_eq!(api.created_expenses()[0].split_among.len(), 3);
}

#[tokio::test]
async fn expense_form_for_unknown_group() {
    let api = trip();
    let mut form = CreateExpenseForm::new("missing");
    form.load(&api).await;

    assert!(form.split().is_none());
    form.amount = "10".to_string();
    assert_eq!(
        form.begin_submit(),
        Err(FormError::Invalid(ValidationError::MissingFields))
    );
}
