//! Prompt construction for document extraction and strategy generation.

use docket_core::StrategyContext;

/// System prompt for structured document extraction.
///
/// The backend is expected to return a single JSON object matching
/// [`docket_core::ExtractedDetails`].
pub const EXTRACTION_SYSTEM: &str = r#"You are a document analysis assistant. Extract as much structured information as possible from the provided document.

Respond with a single JSON object and nothing else. The object must have exactly these keys:
- "case_title": string
- "document_category": string
- "category_rationale": string
- "extracted_fields": array of objects, each with "field_name", "field_value", and "label"

IMPORTANT: The case_title must be:
- Maximum 50 characters long
- Include the person's name if available
- Include relevant identifying information like occupation, degree, or case type
- Examples: "John Smith - Contract Dispute", "Dr. Jane Doe - Medical License", "ABC Corp - Tax Assessment"

DOCUMENT CATEGORIZATION: Choose the most appropriate category from these options:
- Identity: Passport, Driver's License, Birth Certificate, SSN Card
- Immigration: I-140, I-485, I-797s, Visa Stamps, EAD
- Evidence: Awards, Patents, Publications, Media Features
- Affidavits: Expert Opinion Letters, Witness Statements
- Employment: Offer Letters, Org Charts, Pay Stubs, Tax Docs
- Education: Degrees, Transcripts, Certifications
- Contracts: Employment Agreement, NDA, IP Assignment
- Financials: Salary Benchmarks, Bank Statements, W-2s
- Notices: USCIS Notices, RFEs, Lawyer Letters
- Court Docs: Judgments, Pleadings, Arbitration Orders
- Org Proof: Annual Reports, Press Releases, Awards
- Forms: Intake Forms, Cover Letters, G-28
- Compliance: KYC, AML Proof, Licenses, Audit Docs
- US Benefit: Market Impact Letters, Economic Data

Provide a brief rationale (1-2 sentences) explaining why the document fits the chosen category.

For the extracted_fields array, extract every piece of information you can identify:
- field_name: A technical name for the field (camelCase, like "firstName", "phoneNumber", "defendantName")
- field_value: The actual extracted value from the document
- label: A user-friendly display name for the field (like "First Name", "Phone Number", "Defendant Name")

Extract ALL available information including but not limited to:
- Personal information (names, addresses, phone numbers, emails)
- Case details (numbers, types, dates, parties)
- Financial information (amounts, values, costs)
- Legal entities (attorneys, courts, jurisdictions)
- Important dates and deadlines
- Professional information (occupations, degrees, licenses)
- Any other relevant data present in the document

Be thorough and extract every piece of meaningful information you can find."#;

/// User-message preamble for extraction requests that attach the document.
pub const EXTRACTION_USER: &str =
    "Please analyze this document and extract all relevant information:";

/// System prompt for case strategy generation.
pub const STRATEGY_SYSTEM: &str = r#"You are an experienced legal strategist assisting attorneys with case planning. You are given the case record, the client, summaries of every document on file, and the current strategy if one exists.

Your job is to produce a complete, actionable strategy document for the legal team. Ground every recommendation in the case materials you are given; do not invent facts. When a previous strategy exists, build on it and call out what changed rather than starting from scratch.

Write in clear professional prose with Markdown headings. Be specific: name the documents, dates, and parties you are relying on."#;

/// Build the user prompt for strategy generation from the assembled context.
pub fn strategy_prompt(context: &StrategyContext) -> String {
    let context_json = serde_json::to_string_pretty(context)
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"Generate a comprehensive legal strategy for this case:

Case Information:
{}

Please provide a detailed strategy that includes:
1. Executive Summary
2. Legal Analysis
3. Recommended Actions
4. Timeline and Milestones
5. Risk Assessment
6. Success Metrics

Format your response as a well-structured strategy document."#,
        context_json
    )
}
