//! Fixture entities shared by the unit tests.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use model::{
    core::data_type::DataType,
    schema::{
        entity::EntitySchema,
        record::{Entity, FieldRef, Record},
    },
};
use std::str::FromStr;
use uuid::Uuid;

lazy_static! {
    static ref CUSTOMER_SCHEMA: EntitySchema = EntitySchema::builder("Customer")
        .scalar("id", DataType::Int)
        .scalar("name", DataType::String)
        .scalar("age", DataType::nullable(DataType::Int))
        .scalar("balance", DataType::Double)
        .scalar("active", DataType::Boolean)
        .scalar("joined", DataType::Date)
        .scalar("credit", DataType::Decimal)
        .scalar("reference", DataType::Uuid)
        .object("address", Address::schema)
        .collection("orders", Order::schema)
        .build()
        .expect("customer schema");
    static ref ADDRESS_SCHEMA: EntitySchema = EntitySchema::builder("Address")
        .scalar("city", DataType::String)
        .scalar("zip", DataType::String)
        .object("country", Country::schema)
        .build()
        .expect("address schema");
    static ref COUNTRY_SCHEMA: EntitySchema = EntitySchema::builder("Country")
        .scalar("code", DataType::String)
        .build()
        .expect("country schema");
    static ref SHOP_SCHEMA: EntitySchema = EntitySchema::builder("Shop")
        .scalar("name", DataType::String)
        .object("owner", Customer::schema)
        .build()
        .expect("shop schema");
    static ref ORDER_SCHEMA: EntitySchema = EntitySchema::builder("Order")
        .scalar("id", DataType::Int)
        .scalar("total", DataType::Double)
        .scalar("status", DataType::String)
        .build()
        .expect("order schema");
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i32,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub balance: f64,
    pub active: bool,
    pub joined: NaiveDate,
    pub credit: BigDecimal,
    pub reference: Uuid,
    pub address: Option<Address>,
    pub orders: Vec<Order>,
}

impl Customer {
    pub fn sample(id: i32, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            age: None,
            balance: 0.0,
            active: true,
            joined: NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"),
            credit: BigDecimal::from(100),
            reference: Uuid::from_u128(id as u128),
            address: Some(Address::new("Lisbon", "1000-001")),
            orders: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name = name.map(str::to_string);
        self
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn joined_on(mut self, year: i32, month: u32, day: u32) -> Self {
        self.joined = NaiveDate::from_ymd_opt(year, month, day).expect("valid date");
        self
    }

    pub fn with_credit(mut self, credit: &str) -> Self {
        self.credit = BigDecimal::from_str(credit).expect("valid decimal");
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn without_address(mut self) -> Self {
        self.address = None;
        self
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }
}

impl Record for Customer {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "id" => Some(FieldRef::value(self.id)),
            "name" => Some(FieldRef::value(self.name.clone())),
            "age" => Some(FieldRef::value(self.age)),
            "balance" => Some(FieldRef::value(self.balance)),
            "active" => Some(FieldRef::value(self.active)),
            "joined" => Some(FieldRef::value(self.joined)),
            "credit" => Some(FieldRef::value(self.credit.clone())),
            "reference" => Some(FieldRef::value(self.reference)),
            "address" => Some(FieldRef::object(self.address.as_ref())),
            "orders" => Some(FieldRef::collection(&self.orders)),
            _ => None,
        }
    }
}

impl Entity for Customer {
    fn schema() -> &'static EntitySchema {
        &CUSTOMER_SCHEMA
    }
}

#[derive(Debug, Clone)]
pub struct Address {
    pub city: Option<String>,
    pub zip: String,
    pub country: Option<Country>,
}

impl Address {
    pub fn new(city: &str, zip: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            zip: zip.to_string(),
            country: None,
        }
    }

    pub fn with_city(mut self, city: Option<&str>) -> Self {
        self.city = city.map(str::to_string);
        self
    }

    pub fn with_country(mut self, code: &str) -> Self {
        self.country = Some(Country {
            code: code.to_string(),
        });
        self
    }
}

impl Record for Address {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "city" => Some(FieldRef::value(self.city.clone())),
            "zip" => Some(FieldRef::value(self.zip.as_str())),
            "country" => Some(FieldRef::object(self.country.as_ref())),
            _ => None,
        }
    }
}

impl Entity for Address {
    fn schema() -> &'static EntitySchema {
        &ADDRESS_SCHEMA
    }
}

#[derive(Debug, Clone)]
pub struct Country {
    pub code: String,
}

impl Record for Country {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "code" => Some(FieldRef::value(self.code.as_str())),
            _ => None,
        }
    }
}

impl Entity for Country {
    fn schema() -> &'static EntitySchema {
        &COUNTRY_SCHEMA
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i32,
    pub total: f64,
    pub status: Option<String>,
}

impl Order {
    pub fn new(id: i32, total: f64, status: &str) -> Self {
        Self {
            id,
            total,
            status: Some(status.to_string()),
        }
    }
}

impl Record for Order {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "id" => Some(FieldRef::value(self.id)),
            "total" => Some(FieldRef::value(self.total)),
            "status" => Some(FieldRef::value(self.status.clone())),
            _ => None,
        }
    }
}

impl Entity for Order {
    fn schema() -> &'static EntitySchema {
        &ORDER_SCHEMA
    }
}

/// Reaches a collection through an optional object: `owner.orders`.
#[derive(Debug, Clone)]
pub struct Shop {
    pub name: String,
    pub owner: Option<Customer>,
}

impl Shop {
    pub fn new(name: &str, owner: Option<Customer>) -> Self {
        Self {
            name: name.to_string(),
            owner,
        }
    }
}

impl Record for Shop {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match name {
            "name" => Some(FieldRef::value(self.name.as_str())),
            "owner" => Some(FieldRef::object(self.owner.as_ref())),
            _ => None,
        }
    }
}

impl Entity for Shop {
    fn schema() -> &'static EntitySchema {
        &SHOP_SCHEMA
    }
}
