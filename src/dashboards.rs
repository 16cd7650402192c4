use std::{fmt::Display, slice::Iter, str::FromStr};

use thiserror::Error;

/// Every dashboard query scopes itself to activity after the protocol launch.
const STARTING_DATE: &str = "'2022-01-01'";

/// All three variants project a `tx_dt` day column; the time-window filter
/// keys off it.
pub const DATE_COLUMN: &str = "tx_dt";

/// One query variant per dashboard tab. Each carries the SQL it submits to the
/// query engine, the suffix of its snapshot file, and the columns downstream
/// consumers rely on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueryVariant {
    TxsAndGas,
    Tickets,
    Users,
}

use QueryVariant::*;

static QUERY_VARIANTS: [QueryVariant; 3] = [TxsAndGas, Tickets, Users];

#[derive(Debug, Error)]
pub enum ParseQueryVariantError {
    #[error("failed to parse query variant {0}")]
    UnknownVariant(String),
}

impl FromStr for QueryVariant {
    type Err = ParseQueryVariantError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txs-and-gas" => Ok(TxsAndGas),
            "tickets" => Ok(Tickets),
            "users" => Ok(Users),
            unknown_variant => Err(ParseQueryVariantError::UnknownVariant(
                unknown_variant.to_string(),
            )),
        }
    }
}

impl Display for QueryVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxsAndGas => write!(f, "txs-and-gas"),
            Tickets => write!(f, "tickets"),
            Users => write!(f, "users"),
        }
    }
}

impl QueryVariant {
    pub fn iterator() -> Iter<'static, QueryVariant> {
        QUERY_VARIANTS.iter()
    }

    /// Suffix of the snapshot file for this variant.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            TxsAndGas => "txs_and_gas",
            Tickets => "tickets",
            Users => "users",
        }
    }

    /// Columns the summary metrics and the filter need. Validated at the
    /// loader boundary so a changed query projection fails loudly instead of
    /// as a key error somewhere downstream.
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self {
            TxsAndGas => &[
                "tx_dt",
                "contract_address",
                "event_name",
                "tot_txs_count",
                "tot_eth_fee",
            ],
            Tickets => &[
                "tx_dt",
                "daily_eth_volume_tickets_sold",
                "daily_usd_volume_tickets_sold",
            ],
            Users => &["tx_dt", "num_active_users", "avg_num_active_users"],
        }
    }

    pub fn sql(&self) -> String {
        match self {
            TxsAndGas => format!(
                "
                with metawin_txs AS (
                  SELECT
                    *,
                    concat(contract_address, '_', decoded_log:raffleId) AS raffle_id
                  FROM
                    ethereum.core.fact_decoded_event_logs
                  WHERE
                    contract_address IN (
                      SELECT
                        DISTINCT contract_address
                      FROM
                        ethereum.core.fact_decoded_event_logs
                      WHERE
                        decoded_log:\"role\" IN (
                          '0x523a704056dcd17bcf83bed8b68c59416dac1119be77755efe3bde0a64e46e0c',
                          '0xde5ee446972f4e39ab62c03aa34b2096680a875c3fdb3eb2f947cbb93341c058'
                        )
                        and decoded_log:\"sender\" = '0x3684a8007dc9df696a86b0c5c89a8032b78b5b0d'
                        AND block_timestamp > {STARTING_DATE}
                    )
                    AND block_timestamp > {STARTING_DATE}
                )
                SELECT
                  date_trunc('day', v1.block_timestamp) tx_dt,
                  contract_address,
                  event_name,
                  count(DISTINCT v1.tx_hash) AS tot_txs_count,
                  SUM(v2.tx_fee) AS tot_eth_fee,
                  tot_eth_fee / tot_txs_count AS avg_gas_eth_gas_fee_paid_by_smart_contract,
                  AVG(avg_gas_eth_gas_fee_paid_by_smart_contract) OVER(ORDER BY tx_dt)
                FROM
                  metawin_txs v1
                  JOIN ethereum.core.fact_transactions v2 ON v1.tx_hash = v2.tx_hash
                WHERE
                  v2.block_timestamp > {STARTING_DATE}
                GROUP BY
                  1, 2, 3
                "
            ),
            Tickets => format!(
                "
                with metawin_txs AS (
                  SELECT
                    *
                  FROM
                    ethereum.core.fact_decoded_event_logs
                  WHERE
                    contract_address IN (
                      SELECT
                        DISTINCT contract_address
                      FROM
                        ethereum.core.fact_decoded_event_logs
                      WHERE
                        decoded_log:\"role\" = '0x523a704056dcd17bcf83bed8b68c59416dac1119be77755efe3bde0a64e46e0c'
                        and decoded_log:\"sender\" = '0x3684a8007dc9df696a86b0c5c89a8032b78b5b0d'
                        AND block_timestamp > {STARTING_DATE}
                    )
                    AND block_timestamp > {STARTING_DATE}
                ),
                token_price AS (
                  SELECT
                    CASE
                      when symbol = 'WETH' THEN 'ETH'
                      else symbol
                    end as symbol,
                    hour,
                    token_address,
                    decimals,
                    AVG(price) AS avg_token_price_usd
                  FROM
                    ethereum.price.ez_hourly_token_prices
                  WHERE
                    hour > {STARTING_DATE}
                    AND symbol IN ('WETH')
                  GROUP BY
                    1, 2, 3, 4
                )
                SELECT
                  date_trunc('day', tx_timestamp) AS tx_dt,
                  SUM(tot_token_spent) AS daily_eth_volume_tickets_sold,
                  SUM(tot_usd_spent) AS daily_usd_volume_tickets_sold
                FROM
                  (
                    SELECT
                      v1.tx_hash,
                      v1.block_timestamp AS tx_timestamp,
                      decoded_log:raffleId,
                      decoded_log:buyer AS ticket_buyer_address,
                      symbol AS payment_method_token,
                      avg_token_price_usd,
                      v2.amount AS tot_token_spent,
                      tot_token_spent * avg_token_price_usd AS tot_usd_spent
                    FROM
                      metawin_txs v1
                      JOIN ethereum.core.ez_eth_transfers v2 ON v1.tx_hash = v2.tx_hash
                      JOIN token_price ON date_trunc('hour', v1.block_timestamp) = hour
                      AND symbol = 'ETH'
                    WHERE
                      event_name = 'EntrySold'
                  )
                GROUP BY
                  1
                "
            ),
            Users => format!(
                "
                with metawin_txs AS (
                  SELECT
                    *,
                    concat(contract_address, '_', decoded_log:raffleId) AS raffle_id
                  FROM
                    ethereum.core.fact_decoded_event_logs
                  WHERE
                    contract_address IN (
                      SELECT
                        DISTINCT contract_address
                      FROM
                        ethereum.core.fact_decoded_event_logs
                      WHERE
                        decoded_log:\"role\" IN (
                          '0x523a704056dcd17bcf83bed8b68c59416dac1119be77755efe3bde0a64e46e0c',
                          '0xde5ee446972f4e39ab62c03aa34b2096680a875c3fdb3eb2f947cbb93341c058'
                        )
                        and decoded_log:\"sender\" = '0x3684a8007dc9df696a86b0c5c89a8032b78b5b0d'
                        AND block_timestamp > {STARTING_DATE}
                    )
                    AND block_timestamp > {STARTING_DATE}
                ),
                t1 AS (
                  SELECT
                    date_trunc('day', v1.block_timestamp) AS dayt,
                    decoded_log:buyer AS user_address
                  FROM
                    metawin_txs v1
                    JOIN ethereum.core.fact_transactions v2 ON v1.tx_hash = v2.tx_hash
                  WHERE
                    v1.event_name = 'EntrySold'
                    and v2.eth_value > 0
                    and v2.block_timestamp > {STARTING_DATE}
                  GROUP BY
                    1, 2
                ),
                t2 AS (
                  SELECT
                    date_trunc('day', t1.dayt) AS dayt,
                    user_address,
                    COUNT(*) as num_days
                  FROM
                    t1
                  GROUP BY
                    1, 2
                  HAVING
                    COUNT(*) >= 1
                ),
                active_users AS (
                  SELECT
                    dayt,
                    num_days,
                    COUNT(*) as num_active_users
                  FROM
                    t2
                  GROUP BY
                    1, 2
                )
                SELECT
                  dayt as tx_dt,
                  num_active_users,
                  AVG(num_active_users) OVER (ORDER BY dayt) AS avg_num_active_users
                FROM
                  active_users
                GROUP BY
                  1, 2
                "
            ),
        }
    }
}
