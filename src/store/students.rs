//! Student registration records

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Payment state for a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Waived,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Waived => write!(f, "waived"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Payment {
    #[serde(default)]
    pub status: PaymentStatus,
    /// Amount in whole currency units
    #[serde(default)]
    pub amount: u32,
}

/// A registered student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    /// Event names the student registered for
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub payment: Payment,
    /// Who created the record
    pub registered_by: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub payment: Option<Payment>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StudentUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub events: Option<Vec<String>>,
    #[serde(default)]
    pub payment: Option<Payment>,
}

fn validate(name: &str, email: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(Error::Validation(format!("invalid email '{}'", email)));
    }
    Ok(())
}

/// Student document store, optionally persisted as a JSON file
#[derive(Clone, Default)]
pub struct StudentStore {
    students: Arc<RwLock<HashMap<String, Student>>>,
    data_file: Option<PathBuf>,
}

impl StudentStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file-backed store, loading existing records if the file exists
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let students: HashMap<String, Student> = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let records: Vec<Student> = serde_json::from_str(&content)?;
                records.into_iter().map(|s| (s.id.clone(), s)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Loaded {} student record(s) from {}",
            students.len(),
            path.display()
        );

        Ok(Self {
            students: Arc::new(RwLock::new(students)),
            data_file: Some(path),
        })
    }

    /// Register a new student
    pub async fn create(&self, new: NewStudent, registered_by: &str) -> Result<Student> {
        validate(&new.name, &new.email)?;

        let mut students = self.students.write().await;
        let email = new.email.trim().to_lowercase();
        if students.values().any(|s| s.email == email) {
            return Err(Error::StudentAlreadyExists(email));
        }

        let now = chrono::Utc::now();
        let student = Student {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            email,
            phone: new.phone,
            roll_number: new.roll_number,
            events: new.events,
            payment: new.payment.unwrap_or_default(),
            registered_by: registered_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        students.insert(student.id.clone(), student.clone());
        if let Err(e) = self.persist(&students).await {
            students.remove(&student.id);
            return Err(e);
        }

        tracing::info!("Registered student {} ({})", student.id, student.email);
        Ok(student)
    }

    pub async fn get(&self, id: &str) -> Result<Student> {
        self.students
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::StudentNotFound(id.to_string()))
    }

    /// All students, oldest registration first
    pub async fn list(&self) -> Vec<Student> {
        let mut students: Vec<Student> = self.students.read().await.values().cloned().collect();
        students.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        students
    }

    pub async fn update(&self, id: &str, update: StudentUpdate) -> Result<Student> {
        let mut students = self.students.write().await;

        let previous = students
            .get(id)
            .cloned()
            .ok_or_else(|| Error::StudentNotFound(id.to_string()))?;

        let email = update.email.as_ref().map(|e| e.trim().to_lowercase());
        if let Some(email) = &email {
            if students.values().any(|s| s.id != id && &s.email == email) {
                return Err(Error::StudentAlreadyExists(email.clone()));
            }
        }

        let name = update.name.unwrap_or_else(|| previous.name.clone());
        let email = email.unwrap_or_else(|| previous.email.clone());
        validate(&name, &email)?;

        let mut student = previous.clone();
        student.name = name.trim().to_string();
        student.email = email;
        if let Some(phone) = update.phone {
            student.phone = Some(phone);
        }
        if let Some(roll_number) = update.roll_number {
            student.roll_number = Some(roll_number);
        }
        if let Some(events) = update.events {
            student.events = events;
        }
        if let Some(payment) = update.payment {
            student.payment = payment;
        }
        student.updated_at = chrono::Utc::now();

        students.insert(id.to_string(), student.clone());
        if let Err(e) = self.persist(&students).await {
            students.insert(id.to_string(), previous);
            return Err(e);
        }

        tracing::info!("Updated student {}", id);
        Ok(student)
    }

    pub async fn delete(&self, id: &str) -> Result<Student> {
        let mut students = self.students.write().await;
        let removed = students
            .remove(id)
            .ok_or_else(|| Error::StudentNotFound(id.to_string()))?;
        if let Err(e) = self.persist(&students).await {
            students.insert(removed.id.clone(), removed);
            return Err(e);
        }

        tracing::info!("Deleted student {}", id);
        Ok(removed)
    }

    pub async fn count(&self) -> usize {
        self.students.read().await.len()
    }

    async fn persist(&self, students: &HashMap<String, Student>) -> Result<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };

        let mut records: Vec<&Student> = students.values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        let content = serde_json::to_string_pretty(&records)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(name: &str, email: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            roll_number: Some("1812345".to_string()),
            events: vec!["Speed Programming".to_string()],
            payment: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = StudentStore::new();
        let student = store
            .create(new_student("Sara", "Sara@Zab.edu"), "desk@zab.edu")
            .await
            .unwrap();

        assert_eq!(student.email, "sara@zab.edu");
        assert_eq!(student.registered_by, "desk@zab.edu");
        assert_eq!(student.payment.status, PaymentStatus::Pending);

        let fetched = store.get(&student.id).await.unwrap();
        assert_eq!(fetched, student);
    }

    #[tokio::test]
    async fn test_validation() {
        let store = StudentStore::new();
        assert!(matches!(
            store.create(new_student("  ", "a@b.com"), "x").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.create(new_student("Ali", "not-an-email"), "x").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = StudentStore::new();
        store.create(new_student("A", "a@b.com"), "x").await.unwrap();
        assert!(matches!(
            store.create(new_student("B", "A@B.com"), "x").await,
            Err(Error::StudentAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = StudentStore::new();
        let student = store.create(new_student("A", "a@b.com"), "x").await.unwrap();

        let updated = store
            .update(
                &student.id,
                StudentUpdate {
                    payment: Some(Payment {
                        status: PaymentStatus::Paid,
                        amount: 500,
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "A");
        assert_eq!(updated.payment.status, PaymentStatus::Paid);
        assert_eq!(updated.payment.amount, 500);
        assert!(updated.updated_at >= student.updated_at);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = StudentStore::new();
        assert!(matches!(store.get("nope").await, Err(Error::StudentNotFound(_))));
        assert!(matches!(store.delete("nope").await, Err(Error::StudentNotFound(_))));
        assert!(matches!(
            store.update("nope", StudentUpdate::default()).await,
            Err(Error::StudentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_id_with_taken_email() {
        let store = StudentStore::new();
        store.create(new_student("A", "a@b.com"), "x").await.unwrap();

        let result = store
            .update(
                "missing",
                StudentUpdate {
                    email: Some("a@b.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(Error::StudentNotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.json");
        let store = StudentStore::open(&path).await.unwrap();
        let kept = store.create(new_student("A", "a@b.com"), "x").await.unwrap();

        // A directory at the data path makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            store.create(new_student("B", "b@b.com"), "x").await,
            Err(Error::Io(_))
        ));
        assert_eq!(store.count().await, 1);

        assert!(store
            .update(
                &kept.id,
                StudentUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .is_err());
        assert_eq!(store.get(&kept.id).await.unwrap(), kept);

        assert!(store.delete(&kept.id).await.is_err());
        assert_eq!(store.get(&kept.id).await.unwrap(), kept);

        // Retry succeeds once the file is writable again
        std::fs::remove_dir(&path).unwrap();
        let created = store.create(new_student("B", "b@b.com"), "x").await.unwrap();
        assert_eq!(created.email, "b@b.com");
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("students.json");

        let store = StudentStore::open(&path).await.unwrap();
        let student = store.create(new_student("A", "a@b.com"), "x").await.unwrap();
        assert!(path.exists());

        let reopened = StudentStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(&student.id).await.unwrap().email, "a@b.com");

        reopened.delete(&student.id).await.unwrap();
        let reopened = StudentStore::open(&path).await.unwrap();
        assert_eq!(reopened.count().await, 0);
    }
}
