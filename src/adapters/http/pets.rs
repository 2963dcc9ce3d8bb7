use super::{segment, ApiClient};
use crate::domain::model::{NewPet, Pet, Service};
use crate::domain::ports::{PetRepository, ServiceCatalog};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl PetRepository for ApiClient {
    async fn list_pets(&self) -> Result<Vec<Pet>> {
        self.get("/mascotas", &[]).await
    }

    async fn get_pet(&self, id: &str) -> Result<Pet> {
        self.get(&format!("/mascotas/{}", segment(id)), &[]).await
    }

    async fn create_pet(&self, pet: &NewPet) -> Result<Pet> {
        self.send(Method::POST, "/mascotas", pet).await
    }
}

#[async_trait]
impl ServiceCatalog for ApiClient {
    async fn list_services(&self) -> Result<Vec<Service>> {
        self.get("/servicios", &[]).await
    }
}
