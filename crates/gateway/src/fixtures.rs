use std::collections::BTreeMap;

use balview_core::domain::txn::{DrCr, Txn, TxnId};
use balview_core::domain::variance::{VarianceId, VarianceRow, VarianceStatus};
use balview_core::gateway::StaticGateway;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Canned review dataset: period-end balances across the three booking entities.
const VARIANCE_FIXTURES: &[RowFixture] = &[
    RowFixture {
        id: "V1",
        entity: "IN-BLR-PB",
        gl: "101100",
        description: "Cash Nostro Reconciliation",
        prior: 12_500_000,
        current: 14_250_000,
        threshold_pct: 5,
        owner: "a.sharma",
        status: VarianceStatus::Breached,
        last_updated: (2025, 9, 17),
    },
    RowFixture {
        id: "V2",
        entity: "IN-BLR-PB",
        gl: "120400",
        description: "Interbank Placements",
        prior: 48_000_000,
        current: 45_600_000,
        threshold_pct: 5,
        owner: "r.iyer",
        status: VarianceStatus::Investigate,
        last_updated: (2025, 9, 16),
    },
    RowFixture {
        id: "V3",
        entity: "IN-BLR-PB",
        gl: "205300",
        description: "Client Deposits - Savings",
        prior: 96_500_000,
        current: 97_465_000,
        threshold_pct: 3,
        owner: "p.nair",
        status: VarianceStatus::Ok,
        last_updated: (2025, 9, 17),
    },
    RowFixture {
        id: "V4",
        entity: "CH-ZRH-PB",
        gl: "101200",
        description: "Cash Nostro CHF, Correspondent",
        prior: 7_800_000,
        current: 6_630_000,
        threshold_pct: 5,
        owner: "m.keller",
        status: VarianceStatus::Breached,
        last_updated: (2025, 9, 17),
    },
    RowFixture {
        id: "V5",
        entity: "CH-ZRH-PB",
        gl: "140200",
        description: "Lombard Loans",
        prior: 210_000_000,
        current: 222_600_000,
        threshold_pct: 8,
        owner: "s.huber",
        status: VarianceStatus::Investigate,
        last_updated: (2025, 9, 15),
    },
    RowFixture {
        id: "V6",
        entity: "CH-ZRH-PB",
        gl: "260100",
        description: "Accrued Interest Payable",
        prior: 3_200_000,
        current: 3_232_000,
        threshold_pct: 10,
        owner: "m.keller",
        status: VarianceStatus::Ok,
        last_updated: (2025, 9, 16),
    },
    RowFixture {
        id: "V7",
        entity: "CH-ZRH-PB",
        gl: "199900",
        description: "Suspense Account",
        prior: 0,
        current: 845_000,
        threshold_pct: 0,
        owner: "s.huber",
        status: VarianceStatus::Breached,
        last_updated: (2025, 9, 17),
    },
    RowFixture {
        id: "V8",
        entity: "SG-SIN-PB",
        gl: "101300",
        description: "Cash Nostro SGD",
        prior: 15_400_000,
        current: 17_864_000,
        threshold_pct: 5,
        owner: "l.tan",
        status: VarianceStatus::Breached,
        last_updated: (2025, 9, 17),
    },
    RowFixture {
        id: "V9",
        entity: "SG-SIN-PB",
        gl: "150500",
        description: "Fee Receivables",
        prior: 2_750_000,
        current: 2_530_000,
        threshold_pct: 10,
        owner: "w.lim",
        status: VarianceStatus::Investigate,
        last_updated: (2025, 9, 16),
    },
    RowFixture {
        id: "V10",
        entity: "SG-SIN-PB",
        gl: "270000",
        description: "Deferred Income",
        prior: -1_200_000,
        current: -1_380_000,
        threshold_pct: 5,
        owner: "l.tan",
        status: VarianceStatus::Investigate,
        last_updated: (2025, 9, 15),
    },
    RowFixture {
        id: "V11",
        entity: "IN-BLR-PB",
        gl: "310500",
        description: "FX Revaluation Reserve",
        prior: 5_600_000,
        current: 5_656_000,
        threshold_pct: 5,
        owner: "a.sharma",
        status: VarianceStatus::Ok,
        last_updated: (2025, 9, 17),
    },
    RowFixture {
        id: "V12",
        entity: "SG-SIN-PB",
        gl: "205400",
        description: "Client Deposits - Term",
        prior: 132_000_000,
        current: 134_640_000,
        threshold_pct: 3,
        owner: "w.lim",
        status: VarianceStatus::Ok,
        last_updated: (2025, 9, 16),
    },
];

const TXN_FIXTURES: &[(&str, &[PostingFixture])] = &[
    (
        "V1",
        &[
            posting(
                16,
                "SWIFT",
                "MT940 inward remittance - HDFC nostro",
                DrCr::Credit,
                450_000,
                &["nostro", "inward"],
            ),
            posting(
                16,
                "SWIFT",
                "MT940 inward remittance - Citi NY",
                DrCr::Credit,
                380_000,
                &["nostro", "inward"],
            ),
            posting(15, "CBS", "Client payout batch 4471", DrCr::Debit, 120_000, &["payout"]),
            posting(
                15,
                "RECON",
                "Unmatched credit carried forward",
                DrCr::Credit,
                275_000,
                &["unmatched"],
            ),
            posting(14, "SWIFT", "MT202 cover payment", DrCr::Credit, 510_000, &["nostro"]),
            posting(14, "CBS", "FX settlement USD/INR", DrCr::Debit, 90_000, &["fx"]),
            posting(13, "CBS", "Interest credit on nostro balance", DrCr::Credit, 42_000, &[]),
            posting(
                12,
                "RECON",
                "Bank charges pending allocation",
                DrCr::Debit,
                17_000,
                &["charges", "unmatched"],
            ),
            posting(
                12,
                "SWIFT",
                "MT940 inward remittance - Barclays",
                DrCr::Credit,
                305_000,
                &["nostro", "inward"],
            ),
            posting(11, "CBS", "Reversal of duplicate posting", DrCr::Debit, 5_000, &["reversal"]),
        ],
    ),
    (
        "V2",
        &[
            posting(
                16,
                "TREASURY",
                "Call money placement matured",
                DrCr::Credit,
                1_500_000,
                &["money-market"],
            ),
            posting(
                15,
                "TREASURY",
                "Term placement rollover",
                DrCr::Debit,
                600_000,
                &["money-market"],
            ),
            posting(15, "TREASURY", "Placement with SBI 7D", DrCr::Debit, 400_000, &[]),
            posting(14, "CBS", "Interest accrual reversal", DrCr::Credit, 300_000, &["accrual"]),
            posting(
                13,
                "TREASURY",
                "Early termination - Axis 14D",
                DrCr::Credit,
                1_200_000,
                &["money-market"],
            ),
        ],
    ),
    (
        "V4",
        &[
            posting(17, "SWIFT", "MT950 statement import - UBS", DrCr::Debit, 650_000, &["nostro"]),
            posting(
                16,
                "SWIFT",
                "Outgoing client transfer CHF",
                DrCr::Debit,
                420_000,
                &["outward"],
            ),
            posting(15, "RECON", "Manual match adjustment", DrCr::Credit, 35_000, &["manual"]),
            posting(14, "CBS", "Correspondent fee debit", DrCr::Debit, 135_000, &["charges"]),
        ],
    ),
    (
        "V7",
        &[
            posting(
                17,
                "CBS",
                "Unidentified receipt parked",
                DrCr::Credit,
                600_000,
                &["suspense", "aged-0"],
            ),
            posting(
                16,
                "CBS",
                "Failed beneficiary credit returned",
                DrCr::Credit,
                215_000,
                &["suspense"],
            ),
            posting(
                16,
                "RECON",
                "Cheque clearing difference",
                DrCr::Credit,
                30_000,
                &["suspense", "clearing"],
            ),
        ],
    ),
    (
        "V8",
        &[
            posting(
                17,
                "SWIFT",
                "MT940 inward remittance - DBS",
                DrCr::Credit,
                920_000,
                &["nostro", "inward"],
            ),
            posting(
                17,
                "SWIFT",
                "MT940 inward remittance - OCBC",
                DrCr::Credit,
                640_000,
                &["nostro", "inward"],
            ),
            posting(16, "CBS", "Client payout batch 8812", DrCr::Debit, 210_000, &["payout"]),
            posting(16, "SWIFT", "MT202 cover payment", DrCr::Credit, 480_000, &["nostro"]),
            posting(
                15,
                "RECON",
                "Unmatched credit carried forward",
                DrCr::Credit,
                330_000,
                &["unmatched"],
            ),
            posting(15, "CBS", "FX settlement SGD/USD", DrCr::Debit, 150_000, &["fx"]),
            posting(14, "CBS", "Interest credit on nostro balance", DrCr::Credit, 38_000, &[]),
            posting(
                13,
                "RECON",
                "Bank charges pending allocation",
                DrCr::Debit,
                12_000,
                &["charges"],
            ),
            posting(
                12,
                "SWIFT",
                "MT940 inward remittance - UOB",
                DrCr::Credit,
                428_000,
                &["nostro", "inward"],
            ),
        ],
    ),
    (
        "V9",
        &[
            posting(
                16,
                "BILLING",
                "Quarterly custody fees raised",
                DrCr::Debit,
                180_000,
                &["fees"],
            ),
            posting(
                15,
                "CBS",
                "Fee collection from client accounts",
                DrCr::Credit,
                400_000,
                &["fees", "collection"],
            ),
        ],
    ),
    (
        "V10",
        &[
            posting(
                16,
                "BILLING",
                "Advisory retainer received in advance",
                DrCr::Credit,
                250_000,
                &["deferral"],
            ),
            posting(15, "GL", "Monthly release to income", DrCr::Debit, 100_000, &["amortisation"]),
            posting(
                14,
                "BILLING",
                "Annual platform fee billed",
                DrCr::Credit,
                30_000,
                &["deferral"],
            ),
        ],
    ),
];

struct RowFixture {
    id: &'static str,
    entity: &'static str,
    gl: &'static str,
    description: &'static str,
    prior: i64,
    current: i64,
    threshold_pct: i64,
    owner: &'static str,
    status: VarianceStatus,
    last_updated: (i32, u32, u32),
}

struct PostingFixture {
    day: u32,
    source: &'static str,
    narrative: &'static str,
    drcr: DrCr,
    amount: i64,
    tags: &'static [&'static str],
}

const fn posting(
    day: u32,
    source: &'static str,
    narrative: &'static str,
    drcr: DrCr,
    amount: i64,
    tags: &'static [&'static str],
) -> PostingFixture {
    PostingFixture { day, source, narrative, drcr, amount, tags }
}

const BOOK_DATE: (i32, u32, u32) = (2025, 9, 16);

fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn variance_rows() -> Vec<VarianceRow> {
    VARIANCE_FIXTURES
        .iter()
        .map(|fixture| VarianceRow {
            id: VarianceId(fixture.id.to_string()),
            entity: fixture.entity.to_string(),
            book_date: date(BOOK_DATE),
            gl: fixture.gl.to_string(),
            description: fixture.description.to_string(),
            prior: Decimal::new(fixture.prior, 0),
            current: Decimal::new(fixture.current, 0),
            threshold_pct: Decimal::new(fixture.threshold_pct, 0),
            owner: fixture.owner.to_string(),
            status: fixture.status,
            last_updated: date(fixture.last_updated),
        })
        .collect()
}

pub fn transactions() -> BTreeMap<VarianceId, Vec<Txn>> {
    TXN_FIXTURES
        .iter()
        .map(|(var_id, postings)| {
            let txns = postings
                .iter()
                .enumerate()
                .map(|(index, fixture)| Txn {
                    id: TxnId(format!("{var_id}-T{:02}", index + 1)),
                    date: date((2025, 9, fixture.day)),
                    source: fixture.source.to_string(),
                    narrative: fixture.narrative.to_string(),
                    drcr: fixture.drcr,
                    amount: Decimal::new(fixture.amount, 0),
                    tags: (!fixture.tags.is_empty())
                        .then(|| fixture.tags.iter().map(|tag| tag.to_string()).collect()),
                })
                .collect();
            (VarianceId(var_id.to_string()), txns)
        })
        .collect()
}

pub fn transactions_for(var_id: &VarianceId) -> Vec<Txn> {
    transactions().remove(var_id).unwrap_or_default()
}

pub fn static_gateway() -> StaticGateway {
    StaticGateway::new(variance_rows(), transactions())
}
