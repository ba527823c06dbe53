//! Generic CRUD proxy over the provider's fixed endpoint catalog.
//!
//! The API exposes ~15 collections that differ only in their path segment, so
//! one [`Resource`] type parameterized by its path template serves them all.
//! Templates may reference `{merchant_id}` for merchant-scoped collections;
//! the placeholder resolves against the configured credential mode.

// std
use std::borrow::Cow;
// self
use crate::{
	_prelude::*,
	client::{ApiRequest, LogilessClient},
	error::ConfigError,
	http::{HttpTransport, Method},
};

/// Named REST collections exposed by the LOGILESS API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// Article master data.
	Article,
	/// Actual (physical) inventory summaries.
	ActualInventorySummary,
	/// Logical inventory summaries.
	LogicalInventorySummary,
	/// Outbound deliveries.
	OutboundDelivery,
	/// Inbound deliveries.
	InboundDelivery,
	/// Sales orders.
	SalesOrder,
	/// Warehouses.
	Warehouse,
	/// Stores.
	Store,
	/// Warehouse locations.
	Location,
	/// Reorder points.
	ReorderPoint,
	/// Suppliers.
	Supplier,
	/// Article mappings.
	ArticleMap,
	/// Daily inventory summaries.
	DailyInventorySummary,
	/// Transaction logs.
	TransactionLog,
	/// Inter-warehouse transfers.
	InterWarehouseTransfer,
}
impl Endpoint {
	/// Every collection the API serves, in catalog order.
	pub const ALL: [Self; 15] = [
		Self::Article,
		Self::ActualInventorySummary,
		Self::LogicalInventorySummary,
		Self::OutboundDelivery,
		Self::InboundDelivery,
		Self::SalesOrder,
		Self::Warehouse,
		Self::Store,
		Self::Location,
		Self::ReorderPoint,
		Self::Supplier,
		Self::ArticleMap,
		Self::DailyInventorySummary,
		Self::TransactionLog,
		Self::InterWarehouseTransfer,
	];

	/// Returns the collection's URL path segment.
	pub const fn path(self) -> &'static str {
		match self {
			Endpoint::Article => "article",
			Endpoint::ActualInventorySummary => "actual_inventory_summary",
			Endpoint::LogicalInventorySummary => "logical_inventory_summary",
			Endpoint::OutboundDelivery => "outbound_delivery",
			Endpoint::InboundDelivery => "inbound_delivery",
			Endpoint::SalesOrder => "sales_order",
			Endpoint::Warehouse => "warehouse",
			Endpoint::Store => "store",
			Endpoint::Location => "location",
			Endpoint::ReorderPoint => "reorder_point",
			Endpoint::Supplier => "supplier",
			Endpoint::ArticleMap => "article_map",
			Endpoint::DailyInventorySummary => "daily_inventory_summary",
			Endpoint::TransactionLog => "transaction_log",
			Endpoint::InterWarehouseTransfer => "inter_warehouse_transfer",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.path())
	}
}

/// Per-collection facade exposing the provider's five CRUD operations.
///
/// Adds no validation, transformation, or caching of its own; every call
/// delegates straight to [`LogilessClient::request`].
pub struct Resource<'c, C>
where
	C: ?Sized + HttpTransport,
{
	client: &'c LogilessClient<C>,
	template: Cow<'static, str>,
}
impl<'c, C> Resource<'c, C>
where
	C: ?Sized + HttpTransport,
{
	pub(crate) fn new(client: &'c LogilessClient<C>, template: impl Into<Cow<'static, str>>) -> Self {
		Self { client, template: template.into() }
	}

	/// Returns the path template backing this proxy.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Fetches a single resource: GET `{base}/{path}/{id}`.
	pub async fn get(&self, id: &str, query: &[(&str, &str)]) -> Result<Value> {
		let request =
			ApiRequest::new(Method::Get, self.item_path(id)?).with_query_pairs(query);

		self.client.request(request).await
	}

	/// Fetches the collection: GET `{base}/{path}`.
	pub async fn list(&self, query: &[(&str, &str)]) -> Result<Value> {
		let request = ApiRequest::new(Method::Get, self.base_path()?).with_query_pairs(query);

		self.client.request(request).await
	}

	/// Creates a resource: POST `{base}/{path}` with a JSON body.
	pub async fn create(&self, data: Value) -> Result<Value> {
		let request = ApiRequest::new(Method::Post, self.base_path()?).with_body(data);

		self.client.request(request).await
	}

	/// Updates a resource: PUT `{base}/{path}/{id}` with a JSON body.
	pub async fn update(&self, id: &str, data: Value) -> Result<Value> {
		let request = ApiRequest::new(Method::Put, self.item_path(id)?).with_body(data);

		self.client.request(request).await
	}

	/// Deletes a resource: DELETE `{base}/{path}/{id}`.
	pub async fn delete(&self, id: &str) -> Result<Value> {
		let request = ApiRequest::new(Method::Delete, self.item_path(id)?);

		self.client.request(request).await
	}

	fn base_path(&self) -> Result<String> {
		if self.template.contains("{merchant_id}") {
			let merchant_id = self.client.auth().mode().merchant_id().ok_or_else(|| {
				ConfigError::MissingMerchantId { template: self.template.to_string() }
			})?;

			Ok(self.template.replace("{merchant_id}", merchant_id.as_ref()))
		} else {
			Ok(self.template.to_string())
		}
	}

	fn item_path(&self, id: &str) -> Result<String> {
		Ok(format!("{}/{id}", self.base_path()?))
	}
}
impl<C> Debug for Resource<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Resource").field("template", &self.template).finish()
	}
}

impl<C> LogilessClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Returns a proxy for one of the fixed collections.
	pub fn endpoint(&self, endpoint: Endpoint) -> Resource<'_, C> {
		Resource::new(self, endpoint.path())
	}

	/// Returns a proxy for a free-form path template.
	///
	/// Templates may reference `{merchant_id}`, resolved from the configured
	/// credential mode at call time.
	pub fn resource(&self, template: impl Into<Cow<'static, str>>) -> Resource<'_, C> {
		Resource::new(self, template)
	}

	/// Article master data.
	pub fn article(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::Article)
	}

	/// Actual (physical) inventory summaries.
	pub fn actual_inventory_summary(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::ActualInventorySummary)
	}

	/// Logical inventory summaries.
	pub fn logical_inventory_summary(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::LogicalInventorySummary)
	}

	/// Outbound deliveries.
	pub fn outbound_delivery(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::OutboundDelivery)
	}

	/// Inbound deliveries.
	pub fn inbound_delivery(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::InboundDelivery)
	}

	/// Sales orders.
	pub fn sales_order(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::SalesOrder)
	}

	/// Warehouses.
	pub fn warehouse(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::Warehouse)
	}

	/// Stores.
	pub fn store(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::Store)
	}

	/// Warehouse locations.
	pub fn location(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::Location)
	}

	/// Reorder points.
	pub fn reorder_point(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::ReorderPoint)
	}

	/// Suppliers.
	pub fn supplier(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::Supplier)
	}

	/// Article mappings.
	pub fn article_map(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::ArticleMap)
	}

	/// Daily inventory summaries.
	pub fn daily_inventory_summary(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::DailyInventorySummary)
	}

	/// Transaction logs.
	pub fn transaction_log(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::TransactionLog)
	}

	/// Inter-warehouse transfers.
	pub fn inter_warehouse_transfer(&self) -> Resource<'_, C> {
		self.endpoint(Endpoint::InterWarehouseTransfer)
	}
}
