use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::errors::ServiceError;
use crate::models::{
    AccountingDocument, CustomerDocument, Department, DocumentHeader, DocumentLine, DocumentType,
    PaymentDocument, PaymentRecord, ResolvedLine, SaleOrder, SummaryLine,
};

const CURRENCY_VND: &str = "VND";
const DEFAULT_TRANSACTION_KIND: &str = "01";

/// Assembles full submission documents from resolved lines.
///
/// Lines without a unit of measure cannot be posted; they are dropped, and
/// a document with no remaining lines is refused before submission.
#[derive(Debug, Clone)]
pub struct InvoicePayloadBuilder {
    company_code: String,
}

impl InvoicePayloadBuilder {
    pub fn new(company_code: impl Into<String>) -> Self {
        Self {
            company_code: company_code.into(),
        }
    }

    /// Sales invoice for one fulfillment-date split. The split date becomes
    /// both the document number suffix and the document date.
    pub fn build_invoice(
        &self,
        order: &SaleOrder,
        lines: &[ResolvedLine],
        document_date: NaiveDate,
    ) -> Result<AccountingDocument, ServiceError> {
        let document_number =
            format!("{}-{}", order.order_id, document_date.format("%Y%m%d"));
        self.build_line_document(
            order,
            lines,
            DocumentType::SalesInvoice,
            document_number,
            document_date,
        )
    }

    pub fn build_sales_order(
        &self,
        order: &SaleOrder,
        lines: &[ResolvedLine],
    ) -> Result<AccountingDocument, ServiceError> {
        self.build_line_document(
            order,
            lines,
            DocumentType::SalesOrder,
            order.order_id.clone(),
            order.order_date,
        )
    }

    pub fn build_sales_return(
        &self,
        order: &SaleOrder,
        lines: &[ResolvedLine],
    ) -> Result<AccountingDocument, ServiceError> {
        self.build_line_document(
            order,
            lines,
            DocumentType::SalesReturn,
            order.order_id.clone(),
            order.order_date,
        )
    }

    /// Warehouse transfer (GXT) for service orders: goods move from the
    /// selling warehouse to the department's service warehouse.
    pub fn build_warehouse_transfer(
        &self,
        order: &SaleOrder,
        lines: &[ResolvedLine],
        department: Option<&Department>,
    ) -> Result<AccountingDocument, ServiceError> {
        let mut document = self.build_line_document(
            order,
            lines,
            DocumentType::WarehouseTransfer,
            order.order_id.clone(),
            order.order_date,
        )?;
        document.header.source_warehouse_code = document
            .detail
            .first()
            .map(|line| line.warehouse_code.clone())
            .filter(|code| !code.is_empty());
        document.header.target_warehouse_code =
            department.map(|dept| format!("B{}", dept.department_code));
        Ok(document)
    }

    pub fn build_customer(&self, order: &SaleOrder) -> Result<CustomerDocument, ServiceError> {
        if order.customer.code.trim().is_empty() {
            return Err(ServiceError::MissingRequiredField(
                "customer code".to_string(),
            ));
        }
        Ok(CustomerDocument {
            company_code: self.company_code.clone(),
            customer_code: order.customer.code.clone(),
            customer_name: order.customer.name.clone(),
            tax_code: order.customer.tax_code.clone(),
            address: order.customer.address.clone(),
            phone: order.customer.phone.clone(),
            channel_code: order.customer.channel.clone(),
        })
    }

    /// Cash receipt or credit advice for one recorded payment.
    pub fn build_payment(
        &self,
        order: &SaleOrder,
        record: &PaymentRecord,
        document_type: DocumentType,
        document_date: NaiveDate,
    ) -> PaymentDocument {
        let document_number = format!("{}-{}", order.order_id, record.method_code);
        PaymentDocument {
            header: self.header(
                order,
                document_type,
                document_number,
                document_date,
                DEFAULT_TRANSACTION_KIND.to_string(),
            ),
            method_code: record.method_code.clone(),
            amount: record.amount,
            reference: record.reference.clone(),
        }
    }

    fn build_line_document(
        &self,
        order: &SaleOrder,
        lines: &[ResolvedLine],
        document_type: DocumentType,
        document_number: String,
        document_date: NaiveDate,
    ) -> Result<AccountingDocument, ServiceError> {
        let detail: Vec<DocumentLine> = lines
            .iter()
            .filter(|line| {
                let keep = !line.unit.trim().is_empty();
                if !keep {
                    warn!(
                        order_id = %order.order_id,
                        line_number = line.line_number,
                        material_code = %line.material_code,
                        "dropping line without unit of measure"
                    );
                }
                keep
            })
            .map(DocumentLine::from_resolved)
            .collect();

        if detail.is_empty() {
            return Err(ServiceError::MissingRequiredField(format!(
                "order {} has no line with a unit of measure",
                order.order_id
            )));
        }

        let summary = lines
            .iter()
            .filter(|line| !line.unit.trim().is_empty())
            .map(|line| SummaryLine {
                line_number: line.line_number,
                net_discount: line.discounts.total(),
            })
            .collect();

        let transaction_kind = detail
            .first()
            .map(|line| line.transaction_type_code.clone())
            .unwrap_or_else(|| DEFAULT_TRANSACTION_KIND.to_string());

        Ok(AccountingDocument {
            header: self.header(
                order,
                document_type,
                document_number,
                document_date,
                transaction_kind,
            ),
            detail,
            summary,
        })
    }

    fn header(
        &self,
        order: &SaleOrder,
        document_type: DocumentType,
        document_number: String,
        document_date: NaiveDate,
        transaction_kind_code: String,
    ) -> DocumentHeader {
        DocumentHeader {
            company_code: self.company_code.clone(),
            customer_code: order.customer.code.clone(),
            customer_name: order.customer.name.clone(),
            transaction_kind_code,
            document_date,
            posting_date: document_date,
            document_number,
            series_code: document_type.series_code().to_string(),
            currency: CURRENCY_VND.to_string(),
            exchange_rate: Decimal::ONE,
            channel_code: order.channel_code.clone(),
            source_warehouse_code: None,
            target_warehouse_code: None,
        }
    }
}
