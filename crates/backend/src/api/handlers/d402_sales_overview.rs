use axum::{extract::Multipart, http::StatusCode, Json};
use contracts::dashboards::d402_sales_overview::{
    SalesFilterOptions, SalesOverviewRequest, SalesOverviewResponse, SalesUploadResponse,
};

use crate::dashboards::d402_sales_overview::loader::LoadError;
use crate::dashboards::d402_sales_overview::service;
use crate::dashboards::d402_sales_overview::store::{get_store, ActiveDataset};
use crate::shared::config::get_config;
use crate::shared::format::format_money;

type ApiError = (StatusCode, String);

const NO_DATA_MESSAGE: &str = "Please upload a CSV file to start.";

fn load_error(e: LoadError) -> ApiError {
    tracing::error!("D402 Dashboard: Failed to load sales data: {}", e);
    let status = match e {
        LoadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, e.to_string())
}

/// Active dataset or 404 when nothing was uploaded and no default CSV exists.
///
/// Read lock on the common path; the write lock is taken only when the
/// default CSV has to be (re)loaded.
async fn active_dataset() -> Result<ActiveDataset, ApiError> {
    let current = {
        let store = get_store().read().await;
        (!store.default_is_stale()).then(|| store.active())
    };

    let dataset = match current {
        Some(dataset) => dataset,
        None => {
            let mut store = get_store().write().await;
            tokio::task::block_in_place(|| store.refresh_default()).map_err(load_error)?;
            store.active()
        }
    };

    dataset.ok_or_else(|| {
        tracing::warn!("D402 Dashboard: No sales data available");
        (StatusCode::NOT_FOUND, NO_DATA_MESSAGE.to_string())
    })
}

/// POST /api/d402/upload (multipart, field "file")
pub async fn upload(mut multipart: Multipart) -> Result<Json<SalesUploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let source_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        tracing::info!(
            "D402 Dashboard: Upload '{}' ({} bytes)",
            source_name,
            bytes.len()
        );

        let dataset = get_store()
            .write()
            .await
            .upload(&source_name, &bytes)
            .map_err(load_error)?;

        return Ok(Json(SalesUploadResponse {
            source_name: dataset.source_name,
            source_key: dataset.source_key,
            row_count: dataset.records.len(),
        }));
    }

    Err((
        StatusCode::BAD_REQUEST,
        "Multipart field 'file' is missing".to_string(),
    ))
}

/// POST /api/d402/overview
pub async fn get_overview(
    Json(request): Json<SalesOverviewRequest>,
) -> Result<Json<SalesOverviewResponse>, ApiError> {
    let dataset = active_dataset().await?;
    let selection = request.to_selection();
    let top_n = request.top_n.unwrap_or(get_config().sales.top_products);

    let response = service::build_overview(&dataset.records, &selection, top_n);

    if response.is_empty {
        tracing::info!(
            "D402 Dashboard: Empty result for '{}' with {:?}",
            dataset.source_name,
            selection
        );
    } else {
        tracing::info!(
            "D402 Dashboard: {} records, revenue {}, {} orders",
            response.record_count,
            format_money(response.kpis.total_revenue),
            response.kpis.order_count
        );
    }

    Ok(Json(response))
}

/// GET /api/d402/filter_options
pub async fn get_filter_options() -> Result<Json<SalesFilterOptions>, ApiError> {
    let dataset = active_dataset().await?;
    Ok(Json(service::filter_options(&dataset.records)))
}

/// DELETE /api/d402/dataset
pub async fn reset_dataset() -> StatusCode {
    if get_store().write().await.reset() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
