use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Payslips {
    Table,
    Id,
    EmployeeId,
    EmployeeName,
    Month,
    Year,
    GeneratedOn,
    LopDays,
    SalaryStructure,
    Snapshot,
    Filename,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    Id,
    InvoiceNumber,
    BillToName,
    BillTo,
    Items,
    InvoiceDate,
    InvoiceDateText,
    DueDate,
    SubtotalCents,
    FeeCents,
    TotalCents,
    PaymentMethod,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Counters {
    Table,
    Name,
    Value,
}

const INVOICE_SEQUENCE: &str = "invoice";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payslips::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payslips::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payslips::EmployeeId).string_len(32).not_null())
                    .col(ColumnDef::new(Payslips::EmployeeName).string_len(256).not_null())
                    .col(ColumnDef::new(Payslips::Month).integer().not_null())
                    .col(ColumnDef::new(Payslips::Year).integer().not_null())
                    .col(
                        ColumnDef::new(Payslips::GeneratedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payslips::LopDays).double().not_null().default(0.0))
                    .col(ColumnDef::new(Payslips::SalaryStructure).json().not_null())
                    .col(ColumnDef::new(Payslips::Snapshot).json().not_null())
                    .col(ColumnDef::new(Payslips::Filename).string_len(256).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payslips_employee_period")
                    .table(Payslips::Table)
                    .col(Payslips::EmployeeId)
                    .col(Payslips::Year)
                    .col(Payslips::Month)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::InvoiceNumber).string_len(32).not_null())
                    .col(ColumnDef::new(Invoices::BillToName).string_len(256).not_null())
                    .col(ColumnDef::new(Invoices::BillTo).json().not_null())
                    .col(ColumnDef::new(Invoices::Items).json().not_null())
                    .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                    .col(ColumnDef::new(Invoices::InvoiceDateText).string_len(10).not_null())
                    .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                    .col(ColumnDef::new(Invoices::SubtotalCents).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::FeeCents).big_integer())
                    .col(ColumnDef::new(Invoices::TotalCents).big_integer().not_null())
                    .col(ColumnDef::new(Invoices::PaymentMethod).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Invoices::CreatedAt)
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
                    .name("ux_invoices_invoice_number")
                    .table(Invoices::Table)
                    .col(Invoices::InvoiceNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_invoices_bill_to_name")
                    .table(Invoices::Table)
                    .col(Invoices::BillToName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Counters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Counters::Name)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Counters::Value).big_integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(Counters::Table)
            .columns([Counters::Name, Counters::Value])
            .values_panic([INVOICE_SEQUENCE.into(), 0i64.into()])
            .on_conflict(OnConflict::column(Counters::Name).do_nothing().to_owned())
            .to_owned();
        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&seed)).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Counters::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payslips::Table).if_exists().to_owned())
            .await
    }
}
