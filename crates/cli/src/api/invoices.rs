//! `/invoice-reminder/*` endpoints

use super::client::{check_success, data, ApiClient};
use super::types::RequestError;
use reqwest::Method;
use zeeremind_core::{DashboardStats, Invoice, NewInvoice, ReminderLog};

const BASE: &str = "/invoice-reminder/invoices";

pub fn list(client: &ApiClient) -> Result<Vec<Invoice>, RequestError> {
    data(client.get_authed(BASE)?)
}

pub fn get(client: &ApiClient, id: &str) -> Result<Invoice, RequestError> {
    data(client.get_authed(&format!("{}/{}", BASE, id))?)
}

pub fn create(client: &ApiClient, invoice: &NewInvoice) -> Result<Invoice, RequestError> {
    let payload = serde_json::to_value(invoice).map_err(|e| RequestError::Decode(e.to_string()))?;
    data(client.send_authed(Method::POST, BASE, Some(payload))?)
}

pub fn update(client: &ApiClient, id: &str, invoice: &NewInvoice) -> Result<Invoice, RequestError> {
    let payload = serde_json::to_value(invoice).map_err(|e| RequestError::Decode(e.to_string()))?;
    data(client.send_authed(Method::PUT, &format!("{}/{}", BASE, id), Some(payload))?)
}

pub fn delete(client: &ApiClient, id: &str) -> Result<(), RequestError> {
    check_success(client.send_authed(Method::DELETE, &format!("{}/{}", BASE, id), None)?)?;
    Ok(())
}

pub fn mark_paid(client: &ApiClient, id: &str) -> Result<(), RequestError> {
    check_success(client.send_authed(Method::PUT, &format!("{}/{}/pay", BASE, id), None)?)?;
    Ok(())
}

pub fn send_reminder(client: &ApiClient, id: &str) -> Result<(), RequestError> {
    check_success(client.send_authed(Method::POST, &format!("{}/{}/remind", BASE, id), None)?)?;
    Ok(())
}

pub fn logs(client: &ApiClient, id: &str) -> Result<Vec<ReminderLog>, RequestError> {
    data(client.get_authed(&format!("{}/{}/logs", BASE, id))?)
}

pub fn stats(client: &ApiClient) -> Result<DashboardStats, RequestError> {
    data(client.get_authed("/invoice-reminder/stats")?)
}
