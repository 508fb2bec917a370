//! HR vertical slice: the employee register, payslip generation and the
//! sub-admin accounts that operate the back office.

pub mod admins;
pub mod employees;
pub mod payslips;
pub mod subadmins;

#[cfg(test)]
pub(crate) mod test_support {
    use migration::{Migrator, MigratorTrait};
    use platform_db::DbPool;
    use sea_orm::Database;

    use crate::employees::{self, NewEmployee};

    pub async fn memory_db() -> DbPool {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    pub fn new_employee(employee_id: &str, email: &str, phone: &str) -> NewEmployee {
        serde_json::from_value(serde_json::json!({
            "employeeId": employee_id,
            "name": "Ada Lovelace",
            "email": email,
            "phone": phone,
            "dob": "1990-12-10",
            "national_id": "1234-5678-9012",
            "tax_id": "ABCDE1234F",
            "date_of_joining": "2021-04-01",
            "base_salary": 50000,
            "department": "Engineering",
            "designation": "Developer",
            "bank_details": {"account_number": "000111222", "ifsc": "HDFC0001", "bank_name": "HDFC"},
        }))
        .unwrap()
    }

    pub async fn seed_employee(db: &DbPool, employee_id: &str) {
        let email = format!("{}@example.com", employee_id.to_lowercase());
        let phone = format!("+1555{}", employee_id.trim_start_matches("EMP"));
        employees::create(db, new_employee(employee_id, &email, &phone))
            .await
            .unwrap();
    }
}
