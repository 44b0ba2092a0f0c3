use app_error::AppError;
use app_state::AppState;
use askama::Template;
use axum::{extract::State, response::Html};
use std::sync::Arc;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    bank_name: &'a str,
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterPage<'a> {
    bank_name: &'a str,
}

#[derive(Template)]
#[template(path = "customers.html")]
struct CustomersPage<'a> {
    bank_name: &'a str,
    max_page_size: u32,
}

#[derive(Template)]
#[template(path = "transactions.html")]
struct TransactionsPage<'a> {
    bank_name: &'a str,
    max_page_size: u32,
}

pub async fn get_login(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let page = LoginPage {
        bank_name: &state.config.bank_name,
    };
    Ok(Html(page.render()?))
}

pub async fn get_register(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let page = RegisterPage {
        bank_name: &state.config.bank_name,
    };
    Ok(Html(page.render()?))
}

pub async fn get_admin_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let page = CustomersPage {
        bank_name: &state.config.bank_name,
        max_page_size: state.max_page_size(),
    };
    Ok(Html(page.render()?))
}

pub async fn get_admin_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let page = TransactionsPage {
        bank_name: &state.config.bank_name,
        max_page_size: state.max_page_size(),
    };
    Ok(Html(page.render()?))
}
