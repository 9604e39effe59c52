//! Conversion from wire DTOs to domain types.
//!
//! This is the only place where the backend's payload variants are
//! reconciled. Each conversion either yields a fully validated domain value
//! or a [`ConversionError`] naming what was wrong.

use crate::catalog::Catalog;
use crate::domain::{
    DistanceLabel, DomainError, InvalidId, InvalidPrice, Location, LocationDraft, LocationId,
    Price, Route, RouteDraft, RouteId, RouteRef,
};

use super::types::{
    CatalogFileDto, LegacyLocationDto, LocationBody, LocationDto, LocationPayload, RouteBody,
    RouteDto, RouteLocationDto, RouteRefDto, WireId,
};

/// Error converting wire data to domain types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidId(#[from] InvalidId),

    #[error(transparent)]
    InvalidPrice(#[from] InvalidPrice),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A field needed to build the domain value was absent
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

pub fn location_id(id: &WireId) -> Result<LocationId, InvalidId> {
    match id {
        WireId::Number(n) => Ok(LocationId::from_number(*n)),
        WireId::Text(s) => LocationId::new(s),
    }
}

pub fn route_id(id: &WireId) -> Result<RouteId, InvalidId> {
    match id {
        WireId::Number(n) => Ok(RouteId::from_number(*n)),
        WireId::Text(s) => RouteId::new(s),
    }
}

/// Convert a location in either wire shape.
pub fn convert_location(payload: &LocationPayload) -> Result<Location, ConversionError> {
    match payload {
        LocationPayload::Canonical(dto) => convert_canonical_location(dto),
        LocationPayload::Legacy(dto) => convert_legacy_location(dto),
    }
}

fn convert_canonical_location(dto: &LocationDto) -> Result<Location, ConversionError> {
    let routes = dto
        .routes
        .iter()
        .map(convert_route_ref)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Location::new(
        location_id(&dto.id)?,
        &dto.name,
        dto.address.clone(),
        routes,
    )?)
}

fn convert_route_ref(dto: &RouteRefDto) -> Result<RouteRef, ConversionError> {
    let destination_name = dto.destination_name.trim();
    if destination_name.is_empty() {
        return Err(DomainError::EmptyName("route destination").into());
    }
    Ok(RouteRef {
        route_id: route_id(&dto.route_id)?,
        destination_id: dto.destination_id.as_ref().map(location_id).transpose()?,
        destination_name: destination_name.to_string(),
    })
}

fn convert_legacy_location(dto: &LegacyLocationDto) -> Result<Location, ConversionError> {
    let routes = dto
        .route_locations
        .iter()
        .map(convert_route_location)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Location::new(location_id(&dto.id)?, &dto.name, None, routes)?)
}

/// Legacy join records name the destination in `name`; older records only
/// carry it in the embedded route summary.
fn convert_route_location(dto: &RouteLocationDto) -> Result<RouteRef, ConversionError> {
    let destination_name = dto
        .name
        .as_deref()
        .or(dto.delivery_route.as_ref().map(|r| r.name.as_str()))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ConversionError::MissingField("routeLocations[].name"))?;
    Ok(RouteRef {
        route_id: route_id(&dto.delivery_route_id)?,
        destination_id: None,
        destination_name: destination_name.to_string(),
    })
}

/// Convert a canonical route record.
pub fn convert_route(dto: &RouteDto) -> Result<Route, ConversionError> {
    Ok(Route::new(
        route_id(&dto.id)?,
        location_id(&dto.origin_id)?,
        location_id(&dto.destination_id)?,
        &dto.destination_name,
        dto.distance.as_deref().and_then(DistanceLabel::new),
        Price::from_decimal(dto.price)?,
        dto.is_available,
    )?)
}

/// Convert a whole catalog file, validating cross references.
///
/// Locations listed without links get links to all of their outbound routes.
pub fn convert_catalog(dto: &CatalogFileDto) -> Result<Catalog, ConversionError> {
    let locations = dto
        .locations
        .iter()
        .map(convert_location)
        .collect::<Result<Vec<_>, _>>()?;
    let routes = dto
        .routes
        .iter()
        .map(convert_route)
        .collect::<Result<Vec<_>, _>>()?;

    let catalog = if locations.iter().all(|l| l.routes.is_empty()) {
        Catalog::with_embedded_links(locations, routes)?
    } else {
        Catalog::new(locations, routes)?
    };
    Ok(catalog)
}

pub fn location_body(draft: &LocationDraft) -> LocationBody<'_> {
    LocationBody {
        name: draft.name.trim(),
        address: draft.address.as_deref().map(str::trim).filter(|a| !a.is_empty()),
    }
}

pub fn route_body(draft: &RouteDraft) -> RouteBody<'_> {
    RouteBody {
        origin_id: draft.origin.as_str(),
        destination_id: draft.destination.as_str(),
        destination_name: draft.destination_name.trim(),
        distance: draft.distance.as_ref().map(DistanceLabel::as_str),
        price: draft.price.as_decimal(),
        is_available: draft.is_available,
    }
}

/// Convert a route back to its canonical wire form.
pub fn route_dto(route: &Route) -> RouteDto {
    RouteDto {
        id: WireId::Text(route.id.to_string()),
        origin_id: WireId::Text(route.origin.to_string()),
        destination_id: WireId::Text(route.destination.to_string()),
        destination_name: route.destination_name.clone(),
        distance: route.distance.as_ref().map(|d| d.to_string()),
        price: route.price.as_decimal(),
        is_available: route.is_available,
    }
}
