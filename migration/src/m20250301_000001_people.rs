use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    EmployeeId,
    Name,
    Email,
    Phone,
    Dob,
    NationalId,
    TaxId,
    DateOfJoining,
    BaseSalaryCents,
    AnnualSalaryCents,
    Department,
    Designation,
    BankDetails,
    Address,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Admins {
    Table,
    Id,
    AdminId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Subadmins {
    Table,
    Id,
    EmployeeId,
    Username,
    PasswordHash,
    CanViewPayslips,
    CanGeneratePayslip,
    CanViewInvoices,
    CanGenerateInvoice,
    CanAddEmployee,
    CanViewEmployees,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::EmployeeId).string_len(32).not_null())
                    .col(ColumnDef::new(Employees::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Employees::Email).string_len(320).not_null())
                    .col(ColumnDef::new(Employees::Phone).string_len(64).not_null())
                    .col(ColumnDef::new(Employees::Dob).date().not_null())
                    .col(ColumnDef::new(Employees::NationalId).string_len(64).not_null())
                    .col(ColumnDef::new(Employees::TaxId).string_len(64).not_null())
                    .col(ColumnDef::new(Employees::DateOfJoining).date().not_null())
                    .col(
                        ColumnDef::new(Employees::BaseSalaryCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::AnnualSalaryCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Employees::Department).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::Designation).string_len(128).not_null())
                    .col(ColumnDef::new(Employees::BankDetails).json().not_null())
                    .col(ColumnDef::new(Employees::Address).json().not_null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // The pre-insert lookups in the services are only a fast path; these
        // indexes are what actually reject duplicates under concurrent writes.
        for (name, column) in [
            ("ux_employees_employee_id", Employees::EmployeeId),
            ("ux_employees_email", Employees::Email),
            ("ux_employees_phone", Employees::Phone),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name(name)
                        .table(Employees::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Admins::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Admins::AdminId).string_len(64).not_null())
                    .col(ColumnDef::new(Admins::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Admins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("ux_admins_admin_id")
                    .table(Admins::Table)
                    .col(Admins::AdminId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subadmins::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subadmins::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Subadmins::EmployeeId).string_len(32).not_null())
                    .col(ColumnDef::new(Subadmins::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Subadmins::PasswordHash).text().not_null())
                    .col(
                        ColumnDef::new(Subadmins::CanViewPayslips)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subadmins::CanGeneratePayslip)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subadmins::CanViewInvoices)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subadmins::CanGenerateInvoice)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subadmins::CanAddEmployee)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subadmins::CanViewEmployees)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Subadmins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Subadmins::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("ux_subadmins_employee_id", Subadmins::EmployeeId),
            ("ux_subadmins_username", Subadmins::Username),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name(name)
                        .table(Subadmins::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subadmins::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admins::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await
    }
}
