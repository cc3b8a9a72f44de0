use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_donations_table::Migration),
            Box::new(m20240101_000002_create_warehouse_tables::Migration),
            Box::new(m20240101_000003_create_movement_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_donations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_donations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Donations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Donations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Donations::DonorId).uuid().not_null())
                        .col(ColumnDef::new(Donations::CatalogItemId).uuid().null())
                        .col(ColumnDef::new(Donations::ProductName).string().not_null())
                        .col(ColumnDef::new(Donations::ProductCategory).string().null())
                        .col(ColumnDef::new(Donations::Quantity).decimal().not_null())
                        .col(ColumnDef::new(Donations::UnitLabel).string().not_null())
                        .col(ColumnDef::new(Donations::ExpiryDate).date().null())
                        .col(ColumnDef::new(Donations::Status).string().not_null())
                        .col(ColumnDef::new(Donations::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Donations::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_donations_status")
                        .table(Donations::Table)
                        .col(Donations::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_donations_donor_id")
                        .table(Donations::Table)
                        .col(Donations::DonorId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Donations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Donations {
        Table,
        Id,
        DonorId,
        CatalogItemId,
        ProductName,
        ProductCategory,
        Quantity,
        UnitLabel,
        ExpiryDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_warehouse_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_warehouse_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CatalogProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CatalogProducts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CatalogProducts::Name).string().not_null())
                        .col(ColumnDef::new(CatalogProducts::Description).string().null())
                        .col(
                            ColumnDef::new(CatalogProducts::UnitLabel)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CatalogProducts::ExpiryDate).date().null())
                        .col(
                            ColumnDef::new(CatalogProducts::DonatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Product resolution is an exact (name, description) lookup
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_catalog_products_name")
                        .table(CatalogProducts::Table)
                        .col(CatalogProducts::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Deposits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Deposits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Deposits::Name).string().not_null())
                        .col(ColumnDef::new(Deposits::Description).string().null())
                        .col(ColumnDef::new(Deposits::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Inventory::DepositId).uuid().not_null())
                        .col(ColumnDef::new(Inventory::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(Inventory::QuantityAvailable)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Inventory::LastUpdated)
                                .timestamp()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(Inventory::DepositId)
                                .col(Inventory::ProductId),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Deposits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CatalogProducts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum CatalogProducts {
        Table,
        Id,
        Name,
        Description,
        UnitLabel,
        ExpiryDate,
        DonatedAt,
    }

    #[derive(Iden)]
    enum Deposits {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Inventory {
        Table,
        DepositId,
        ProductId,
        QuantityAvailable,
        Version,
        LastUpdated,
    }
}

mod m20240101_000003_create_movement_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_movement_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MovementHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MovementHeaders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementHeaders::OccurredAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovementHeaders::DonorActorId).uuid().null())
                        .col(
                            ColumnDef::new(MovementHeaders::OperatorActorId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(MovementHeaders::Status).string().not_null())
                        .col(ColumnDef::new(MovementHeaders::Note).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MovementLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MovementLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovementLines::HeaderId).uuid().not_null())
                        .col(ColumnDef::new(MovementLines::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(MovementLines::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLines::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MovementLines::ActorRole)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MovementLines::Note).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_movement_lines_header_id")
                                .from(MovementLines::Table, MovementLines::HeaderId)
                                .to(MovementHeaders::Table, MovementHeaders::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movement_lines_header_id")
                        .table(MovementLines::Table)
                        .col(MovementLines::HeaderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movement_lines_product_id")
                        .table(MovementLines::Table)
                        .col(MovementLines::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MovementLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(MovementHeaders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MovementHeaders {
        Table,
        Id,
        OccurredAt,
        DonorActorId,
        OperatorActorId,
        Status,
        Note,
    }

    #[derive(Iden)]
    enum MovementLines {
        Table,
        Id,
        HeaderId,
        ProductId,
        Quantity,
        TransactionType,
        ActorRole,
        Note,
    }
}
