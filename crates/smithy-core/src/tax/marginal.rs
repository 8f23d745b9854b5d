use rust_decimal::Decimal;

use crate::types::{Money, Rate};

use super::tables::{Province, TaxBracket, TaxTables};

impl TaxTables {
    /// Combined federal + provincial marginal rate on the next dollar of
    /// income.
    ///
    /// The federal basic personal amount is subtracted first; at or below it
    /// the rate is zero. The provincial lookup reuses the federally adjusted
    /// income, except British Columbia, which subtracts its own basic
    /// personal amount from the raw income. Provinces outside the supported
    /// set resolve to the flat fallback rate.
    ///
    /// A marginal (not average) rate is the right basis here: the HELOC
    /// interest deduction and rental income land on top of an existing
    /// income base.
    pub fn marginal_rate(&self, province: &Province, net_taxable_income: Money) -> Rate {
        let schedule = match self.schedule(province) {
            Some(schedule) => schedule,
            None => return self.unknown_province_rate,
        };

        let adjusted = (net_taxable_income - self.basic_personal_amount).max(Decimal::ZERO);
        if adjusted <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let federal =
            marginal_bracket_rate(&self.federal_brackets, adjusted).unwrap_or(Decimal::ZERO);

        let provincial = if schedule.brackets.is_empty() {
            schedule.flat_rate
        } else if *province == Province::BC {
            // BC applies its own basic personal amount to the raw income
            let bc_adjusted =
                (net_taxable_income - self.bc_basic_personal_amount).max(Decimal::ZERO);
            if bc_adjusted <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                marginal_bracket_rate(&schedule.brackets, bc_adjusted)
                    .unwrap_or(schedule.flat_rate)
            }
        } else {
            marginal_bracket_rate(&schedule.brackets, adjusted).unwrap_or(schedule.flat_rate)
        };

        federal + provincial
    }
}

/// Highest bracket whose threshold lies strictly below the income.
fn marginal_bracket_rate(brackets: &[TaxBracket], income: Money) -> Option<Rate> {
    brackets
        .iter()
        .rev()
        .find(|b| income > b.threshold)
        .map(|b| b.rate)
}
