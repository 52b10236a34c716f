use actix_web::web::Data;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::error::ChatPayError;
use crate::infrastructure::storage::contact_store::ContactStore;

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[post("/contacts")]
pub async fn create_contact(
    req: web::Json<CreateContactRequest>,
    store: Data<Arc<ContactStore>>,
) -> Result<HttpResponse, ChatPayError> {
    let contact = store.add(&req.name, &req.address)?;
    Ok(HttpResponse::Created().json(contact))
}

#[get("/contacts")]
pub async fn list_contacts(store: Data<Arc<ContactStore>>) -> Result<HttpResponse, ChatPayError> {
    let contacts = store.list();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "count": contacts.len(),
        "contacts": contacts,
    })))
}

#[put("/contacts/{id}")]
pub async fn update_contact(
    path: web::Path<String>,
    req: web::Json<UpdateContactRequest>,
    store: Data<Arc<ContactStore>>,
) -> Result<HttpResponse, ChatPayError> {
    let contact = store.update(&path, req.name.as_deref(), req.address.as_deref())?;
    Ok(HttpResponse::Ok().json(contact))
}

#[delete("/contacts/{id}")]
pub async fn delete_contact(
    path: web::Path<String>,
    store: Data<Arc<ContactStore>>,
) -> Result<HttpResponse, ChatPayError> {
    let id = path.into_inner();
    if !store.remove(&id)? {
        return Err(ChatPayError::ContactNotFound(id));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "deleted": true,
        "id": id,
    })))
}
