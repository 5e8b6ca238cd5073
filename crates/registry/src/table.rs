//! Built-in contract reference table
//!
//! Exchange base margin rates and lot multipliers for every product the
//! registry knows without a live source. Canonical codes are assigned when
//! the table is loaded into a snapshot, because they depend on the vendor
//! tag and the per-exchange case rule.

use contango_core::{Category, ContractDescriptor, Exchange, Price, Rate};
use rust_decimal_macros::dec;

struct Row {
    product: &'static str,
    name: &'static str,
    exchange: Exchange,
    category: Category,
    multiplier: u32,
    rate: Rate,
    tick: Price,
    unit: &'static str,
    months: &'static str,
}

impl Row {
    fn into_descriptor(self) -> ContractDescriptor {
        ContractDescriptor::new(self.product, self.exchange, self.category, self.multiplier, self.rate)
            .with_name(self.name)
            .with_tick_size(self.tick)
            .with_trading_unit(self.unit)
            .with_delivery_months(self.months)
    }
}

macro_rules! row {
    ($product:literal, $name:literal, $exchange:ident, $category:ident, $mult:literal, $rate:tt, $tick:tt, $unit:literal, $months:expr) => {
        Row {
            product: $product,
            name: $name,
            exchange: Exchange::$exchange,
            category: Category::$category,
            multiplier: $mult,
            rate: dec!($rate),
            tick: dec!($tick),
            unit: $unit,
            months: $months,
        }
    };
}

const ALL_MONTHS: &str = "1-12";
const ODD_MONTHS: &str = "1,3,5,7,9,11";
const QUARTERLY: &str = "3,6,9,12";
const INDEX_MONTHS: &str = "current, next, two following quarterly";
const RUBBER_MONTHS: &str = "1,3-11";
const SOY_MONTHS: &str = "1,3,5,7,8,9,11,12";

/// Every product in the built-in table
pub fn static_table() -> Vec<ContractDescriptor> {
    rows().into_iter().map(Row::into_descriptor).collect()
}

fn rows() -> Vec<Row> {
    vec![
        // SHFE
        row!("CU", "SHFE Copper", Shfe, BaseMetals, 5, 0.08, 10, "5 t/lot", ALL_MONTHS),
        row!("AL", "SHFE Aluminium", Shfe, BaseMetals, 5, 0.07, 5, "5 t/lot", ALL_MONTHS),
        row!("ZN", "SHFE Zinc", Shfe, BaseMetals, 5, 0.08, 5, "5 t/lot", ALL_MONTHS),
        row!("PB", "SHFE Lead", Shfe, BaseMetals, 5, 0.08, 5, "5 t/lot", ALL_MONTHS),
        row!("NI", "SHFE Nickel", Shfe, BaseMetals, 1, 0.08, 10, "1 t/lot", ALL_MONTHS),
        row!("SN", "SHFE Tin", Shfe, BaseMetals, 1, 0.07, 10, "1 t/lot", ALL_MONTHS),
        row!("AU", "SHFE Gold", Shfe, PreciousMetals, 1000, 0.06, 0.02, "1000 g/lot", "2,4,6,8,10,12"),
        row!("AG", "SHFE Silver", Shfe, PreciousMetals, 15, 0.08, 1, "15 kg/lot", ALL_MONTHS),
        row!("RB", "Rebar", Shfe, Industrial, 10, 0.09, 1, "10 t/lot", ALL_MONTHS),
        row!("HC", "Hot-rolled Coil", Shfe, Industrial, 10, 0.08, 1, "10 t/lot", ALL_MONTHS),
        row!("SS", "Stainless Steel", Shfe, Industrial, 5, 0.08, 5, "5 t/lot", ALL_MONTHS),
        row!("WR", "Wire Rod", Shfe, Industrial, 10, 0.08, 1, "10 t/lot", ALL_MONTHS),
        row!("FU", "Fuel Oil", Shfe, EnergyChemical, 10, 0.10, 1, "10 t/lot", ALL_MONTHS),
        row!("BU", "Bitumen", Shfe, EnergyChemical, 10, 0.08, 2, "10 t/lot", QUARTERLY),
        row!("RU", "Natural Rubber", Shfe, Industrial, 10, 0.09, 5, "10 t/lot", RUBBER_MONTHS),
        // DCE
        row!("C", "Corn", Dce, Agriculture, 10, 0.05, 1, "10 t/lot", ODD_MONTHS),
        row!("CS", "Corn Starch", Dce, Agriculture, 10, 0.05, 1, "10 t/lot", ODD_MONTHS),
        row!("A", "Soybean No.1", Dce, Agriculture, 10, 0.05, 1, "10 t/lot", ODD_MONTHS),
        row!("B", "Soybean No.2", Dce, Agriculture, 10, 0.05, 1, "10 t/lot", ODD_MONTHS),
        row!("M", "Soybean Meal", Dce, Agriculture, 10, 0.05, 1, "10 t/lot", SOY_MONTHS),
        row!("Y", "Soybean Oil", Dce, Agriculture, 10, 0.05, 2, "10 t/lot", SOY_MONTHS),
        row!("P", "Palm Oil", Dce, Agriculture, 10, 0.05, 2, "10 t/lot", SOY_MONTHS),
        row!("L", "Polyethylene", Dce, EnergyChemical, 5, 0.05, 5, "5 t/lot", ODD_MONTHS),
        row!("V", "PVC", Dce, EnergyChemical, 5, 0.05, 5, "5 t/lot", ODD_MONTHS),
        row!("PP", "Polypropylene", Dce, EnergyChemical, 5, 0.05, 1, "5 t/lot", ODD_MONTHS),
        row!("JD", "Egg", Dce, Agriculture, 10, 0.08, 1, "10 t/lot", "1,3-6,9-12"),
        row!("I", "Iron Ore", Dce, Industrial, 100, 0.08, 0.5, "100 t/lot", ODD_MONTHS),
        row!("J", "Coke", Dce, EnergyChemical, 100, 0.08, 0.5, "100 t/lot", ODD_MONTHS),
        row!("JM", "Coking Coal", Dce, EnergyChemical, 60, 0.08, 0.5, "60 t/lot", ODD_MONTHS),
        // CZCE
        row!("WH", "Strong Gluten Wheat", Czce, Agriculture, 20, 0.05, 1, "20 t/lot", ODD_MONTHS),
        row!("PM", "Common Wheat", Czce, Agriculture, 50, 0.05, 1, "50 t/lot", ODD_MONTHS),
        row!("CF", "Cotton", Czce, Agriculture, 5, 0.05, 5, "5 t/lot", ODD_MONTHS),
        row!("CY", "Cotton Yarn", Czce, Agriculture, 5, 0.06, 5, "5 t/lot", ODD_MONTHS),
        row!("SR", "White Sugar", Czce, Agriculture, 10, 0.06, 1, "10 t/lot", ODD_MONTHS),
        row!("TA", "PTA", Czce, EnergyChemical, 5, 0.06, 2, "5 t/lot", ODD_MONTHS),
        row!("MA", "Methanol", Czce, EnergyChemical, 10, 0.06, 1, "10 t/lot", ODD_MONTHS),
        row!("FG", "Glass", Czce, Industrial, 20, 0.06, 1, "20 t/lot", ODD_MONTHS),
        row!("OI", "Rapeseed Oil", Czce, Agriculture, 10, 0.05, 1, "10 t/lot", ODD_MONTHS),
        row!("RM", "Rapeseed Meal", Czce, Agriculture, 10, 0.05, 1, "10 t/lot", ODD_MONTHS),
        row!("ZC", "Thermal Coal", Czce, EnergyChemical, 100, 0.06, 0.2, "100 t/lot", ODD_MONTHS),
        row!("SA", "Soda Ash", Czce, Industrial, 20, 0.06, 1, "20 t/lot", ODD_MONTHS),
        row!("AP", "Apple", Czce, Agriculture, 10, 0.10, 1, "10 t/lot", "1,3,4,5,10,11,12"),
        row!("CJ", "Red Jujube", Czce, Agriculture, 5, 0.05, 5, "5 t/lot", "1,3,5,7,9,12"),
        row!("UR", "Urea", Czce, EnergyChemical, 20, 0.05, 1, "20 t/lot", ALL_MONTHS),
        row!("PF", "Polyester Staple Fiber", Czce, EnergyChemical, 5, 0.05, 2, "5 t/lot", ALL_MONTHS),
        // CFFEX
        row!("IF", "CSI 300 Index", Cffex, Financial, 300, 0.12, 0.2, "300 CNY/point", INDEX_MONTHS),
        row!("IC", "CSI 500 Index", Cffex, Financial, 200, 0.12, 0.2, "200 CNY/point", INDEX_MONTHS),
        row!("IH", "SSE 50 Index", Cffex, Financial, 300, 0.12, 0.2, "300 CNY/point", INDEX_MONTHS),
        row!("IM", "CSI 1000 Index", Cffex, Financial, 200, 0.12, 0.2, "200 CNY/point", INDEX_MONTHS),
        row!("T", "10-Year Treasury Bond", Cffex, Financial, 10000, 0.015, 0.005, "10000 CNY/contract", QUARTERLY),
        row!("TF", "5-Year Treasury Bond", Cffex, Financial, 10000, 0.012, 0.005, "10000 CNY/contract", QUARTERLY),
        row!("TS", "2-Year Treasury Bond", Cffex, Financial, 20000, 0.005, 0.002, "20000 CNY/contract", QUARTERLY),
        // INE
        row!("SC", "Crude Oil", Ine, EnergyChemical, 1000, 0.10, 0.1, "1000 bbl/lot", "1-12 consecutive, then 8 quarterly"),
        row!("NR", "TSR 20 Rubber", Ine, Industrial, 10, 0.08, 5, "10 t/lot", RUBBER_MONTHS),
        row!("LU", "Low Sulfur Fuel Oil", Ine, EnergyChemical, 10, 0.08, 1, "10 t/lot", ALL_MONTHS),
        row!("BC", "International Copper", Ine, BaseMetals, 5, 0.08, 10, "5 t/lot", ALL_MONTHS),
        // GFEX
        row!("SI", "Industrial Silicon", Gfex, Industrial, 10, 0.08, 5, "10 t/lot", ALL_MONTHS),
        row!("LC", "Lithium Carbonate", Gfex, Industrial, 1, 0.12, 50, "1 t/lot", ALL_MONTHS),
    ]
}
